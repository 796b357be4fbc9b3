/// Async counterpart to the standard library's `TryFrom<T>` trait.
///
/// Used for conversions that have to touch the disk, e.g. building a
/// workzone document or a file fingerprint from a path.
pub trait AsyncTryFrom<T>: Sized {
    /// The error type that can occur during conversion.
    type Error;

    /// Performs the fallible asynchronous conversion from `T` to `Self`.
    async fn async_try_from(value: T) -> Result<Self, Self::Error>;
}

/// Async counterpart to `TryInto<T>`.
pub trait AsyncTryInto<T> {
    /// The error type that can occur during conversion.
    type Error;

    /// Performs the fallible asynchronous conversion from `Self` to `T`.
    async fn async_try_into(self) -> Result<T, Self::Error>;
}

/// Blanket implementation for `AsyncTryInto<U>` when `U` implements `AsyncTryFrom<T>`.
///
/// This mirrors the standard library's blanket implementation for `TryInto<T>`.
impl<T, U> AsyncTryInto<U> for T
where
    U: AsyncTryFrom<T>,
{
    type Error = U::Error;

    async fn async_try_into(self) -> Result<U, Self::Error> {
        U::async_try_from(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NumberWrapper(i32);

    impl AsyncTryFrom<String> for NumberWrapper {
        type Error = std::num::ParseIntError;

        fn async_try_from(value: String) -> impl Future<Output = Result<Self, Self::Error>> + Send {
            async move {
                let number = value.parse::<i32>()?;
                Ok(NumberWrapper(number))
            }
        }
    }

    #[test]
    fn async_try_from_success() {
        futures::executor::block_on(async {
            let wrapper = NumberWrapper::async_try_from("42".to_string())
                .await
                .unwrap();
            assert_eq!(wrapper.0, 42);
        });
    }

    #[test]
    fn async_try_from_failure() {
        futures::executor::block_on(async {
            let result = NumberWrapper::async_try_from("not_a_number".to_string()).await;
            assert!(result.is_err());
        });
    }

    #[test]
    fn async_try_into_goes_through_async_try_from() {
        futures::executor::block_on(async {
            let wrapper: Result<NumberWrapper, _> = "123".to_string().async_try_into().await;
            assert_eq!(wrapper.unwrap().0, 123);
        });
    }
}
