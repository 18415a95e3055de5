pub mod attendance;
pub mod department;
pub mod designation;
pub mod employee;
pub mod leave_request;
pub mod role;
pub mod user;

/// Implements `sqlx::Type`/`sqlx::Decode` for a strum-backed enum stored as a
/// VARCHAR column. Binding goes through `AsRef<str>` at the call site.
macro_rules! text_column {
    ($ty:ty) => {
        impl sqlx::Type<sqlx::MySql> for $ty {
            fn type_info() -> sqlx::mysql::MySqlTypeInfo {
                <str as sqlx::Type<sqlx::MySql>>::type_info()
            }

            fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
                <str as sqlx::Type<sqlx::MySql>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::MySql> for $ty {
            fn decode(
                value: sqlx::mysql::MySqlValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as sqlx::Decode<sqlx::MySql>>::decode(value)?;
                Ok(text.parse::<$ty>()?)
            }
        }
    };
}

pub(crate) use text_column;
