use crate::{
    api::{attendance, department, employee, leave_request},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::{Context, Result};
use std::sync::Arc;

type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

// Per-route limiter
fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    };
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms.max(1))
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .context("invalid rate limit configuration")?;
    Ok(Governor::new(&cfg))
}

/// Rate limiters, built once at startup and shared across workers.
#[derive(Clone)]
pub struct Limiters {
    login: Arc<Limiter>,
    register: Arc<Limiter>,
    refresh: Arc<Limiter>,
    protected: Arc<Limiter>,
}

impl Limiters {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            login: Arc::new(build_limiter(config.rate_login_per_min)?),
            register: Arc::new(build_limiter(config.rate_register_per_min)?),
            refresh: Arc::new(build_limiter(config.rate_refresh_per_min)?),
            protected: Arc::new(build_limiter(config.rate_protected_per_min)?),
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &Limiters) {
    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(limiters.login.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(limiters.register.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(limiters.refresh.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(limiters.login.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(limiters.protected.clone())
            .configure(protected_routes),
    );
}

/// Everything behind the bearer-token middleware. Literal segments are
/// registered ahead of `/{id}` so they are not captured as ids.
pub fn protected_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/employee")
            // /employee
            .service(
                web::resource("")
                    .route(web::post().to(employee::create_employee))
                    .route(web::get().to(employee::list_employees)),
            )
            .service(
                web::resource("/code/{code}").route(web::get().to(employee::get_employee_by_code)),
            )
            // /employee/{id}/status
            .service(
                web::resource("/{id}/status").route(web::put().to(employee::set_employee_status)),
            )
            // /employee/{id}/subordinates
            .service(
                web::resource("/{id}/subordinates").route(web::get().to(employee::subordinates)),
            )
            // /employee/{id}
            .service(
                web::resource("/{id}")
                    .route(web::put().to(employee::update_employee))
                    .route(web::get().to(employee::get_employee))
                    .route(web::delete().to(employee::delete_employee)),
            ),
    )
    .service(
        web::scope("/leave")
            // /leave
            .service(
                web::resource("")
                    .route(web::get().to(leave_request::leave_list))
                    .route(web::post().to(leave_request::create_leave)),
            )
            .service(web::resource("/mine").route(web::get().to(leave_request::my_leaves)))
            .service(web::resource("/pending").route(web::get().to(leave_request::pending_leaves)))
            .service(
                web::resource("/employee/{employee_id}")
                    .route(web::get().to(leave_request::employee_leaves)),
            )
            .service(
                web::resource("/balance/{employee_id}/{year}")
                    .route(web::get().to(leave_request::leave_balance)),
            )
            // /leave/{id}
            .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
            // /leave/{id}/approve
            .service(
                web::resource("/{id}/approve").route(web::put().to(leave_request::approve_leave)),
            )
            // /leave/{id}/reject
            .service(
                web::resource("/{id}/reject").route(web::put().to(leave_request::reject_leave)),
            )
            // /leave/{id}/cancel
            .service(
                web::resource("/{id}/cancel").route(web::put().to(leave_request::cancel_leave)),
            ),
    )
    .service(
        web::scope("/attendance")
            // /attendance
            .service(
                web::resource("")
                    .route(web::put().to(attendance::check_out))
                    .route(web::post().to(attendance::check_in)),
            )
            .service(web::resource("/mark").route(web::post().to(attendance::mark_attendance)))
            .service(web::resource("/mine").route(web::get().to(attendance::my_attendance)))
            .service(
                web::resource("/employee/{employee_id}")
                    .route(web::get().to(attendance::employee_attendance)),
            )
            .service(
                web::resource("/summary/{employee_id}")
                    .route(web::get().to(attendance::attendance_summary)),
            ),
    )
    .service(
        web::scope("/department")
            .service(
                web::resource("")
                    .route(web::post().to(department::create_department))
                    .route(web::get().to(department::list_departments)),
            )
            .service(web::resource("/active").route(web::get().to(department::active_departments)))
            .service(
                web::resource("/{id}")
                    .route(web::get().to(department::get_department))
                    .route(web::put().to(department::update_department))
                    .route(web::delete().to(department::delete_department)),
            ),
    )
    .service(
        web::scope("/designation")
            .service(
                web::resource("")
                    .route(web::post().to(department::create_designation))
                    .route(web::get().to(department::list_designations)),
            )
            .service(web::resource("/{id}").route(web::get().to(department::get_designation))),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
