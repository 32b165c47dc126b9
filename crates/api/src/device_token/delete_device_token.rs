use crate::shared::usecase::UseCase;
use daybell_infra::DaybellContext;

/// Deletes a device token on sign-out. Idempotent: deleting a token that was
/// already pruned or never registered succeeds with a zero count.
#[derive(Debug)]
pub struct DeleteDeviceTokenUseCase {
    pub fcm_token: String,
}

#[derive(Debug)]
pub struct UseCaseResponse {
    pub deleted_count: i64,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for DeleteDeviceTokenUseCase {
    type Response = UseCaseResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteDeviceToken";

    async fn execute(&mut self, ctx: &DaybellContext) -> Result<Self::Response, Self::Error> {
        let res = ctx
            .repos
            .device_tokens
            .delete_by_token(&self.fcm_token)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(UseCaseResponse {
            deleted_count: res.deleted_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybell_domain::{DeviceToken, DeviceType, ID};
    use daybell_infra::setup_context_inmemory;

    #[tokio::test]
    async fn deletes_registered_token() {
        let ctx = setup_context_inmemory();
        let user_id = ID::new();
        ctx.repos
            .device_tokens
            .upsert_by_token(&DeviceToken::new(
                user_id.clone(),
                "fcm-token-1".to_string(),
                DeviceType::Ios,
            ))
            .await
            .unwrap();

        let mut usecase = DeleteDeviceTokenUseCase {
            fcm_token: "fcm-token-1".to_string(),
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.deleted_count, 1);

        let tokens = ctx
            .repos
            .device_tokens
            .find_by_users(&[user_id])
            .await
            .unwrap();
        assert!(tokens.is_empty());
    }

    #[tokio::test]
    async fn deleting_unknown_token_succeeds_with_zero_count() {
        let ctx = setup_context_inmemory();

        let mut usecase = DeleteDeviceTokenUseCase {
            fcm_token: "never-registered".to_string(),
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.deleted_count, 0);
    }
}
