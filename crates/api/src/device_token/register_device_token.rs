use crate::shared::usecase::UseCase;
use daybell_domain::{DeviceToken, DeviceType, ID};
use daybell_infra::DaybellContext;

/// Registers an FCM token for a user. The token column is unique, so a token
/// already registered to another user is silently transferred to the caller,
/// which happens whenever someone signs in to a different account on the
/// same phone.
#[derive(Debug)]
pub struct RegisterDeviceTokenUseCase {
    pub user_id: ID,
    pub fcm_token: String,
    pub device_type: String,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum UseCaseError {
    #[error("Invalid device type provided: {0}")]
    InvalidDeviceType(String),
    #[error("Device token cannot be empty")]
    EmptyToken,
    #[error("Internal storage error")]
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for RegisterDeviceTokenUseCase {
    type Response = DeviceToken;

    type Error = UseCaseError;

    const NAME: &'static str = "RegisterDeviceToken";

    async fn execute(&mut self, ctx: &DaybellContext) -> Result<Self::Response, Self::Error> {
        if self.fcm_token.trim().is_empty() {
            return Err(UseCaseError::EmptyToken);
        }
        let device_type = self
            .device_type
            .parse::<DeviceType>()
            .map_err(|_| UseCaseError::InvalidDeviceType(self.device_type.clone()))?;

        let device_token =
            DeviceToken::new(self.user_id.clone(), self.fcm_token.clone(), device_type);
        ctx.repos
            .device_tokens
            .upsert_by_token(&device_token)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(device_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybell_infra::setup_context_inmemory;

    #[tokio::test]
    async fn registers_a_token_for_a_user() {
        let ctx = setup_context_inmemory();
        let user_id = ID::new();

        let mut usecase = RegisterDeviceTokenUseCase {
            user_id: user_id.clone(),
            fcm_token: "fcm-token-1".to_string(),
            device_type: "ANDROID".to_string(),
        };
        usecase.execute(&ctx).await.expect("To register token");

        let tokens = ctx
            .repos
            .device_tokens
            .find_by_users(&[user_id])
            .await
            .unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token, "fcm-token-1");
        assert_eq!(tokens[0].device_type, DeviceType::Android);
    }

    #[tokio::test]
    async fn reregistering_transfers_token_to_the_new_user() {
        let ctx = setup_context_inmemory();
        let first_user = ID::new();
        let second_user = ID::new();

        let mut usecase = RegisterDeviceTokenUseCase {
            user_id: first_user.clone(),
            fcm_token: "shared-phone".to_string(),
            device_type: "IOS".to_string(),
        };
        usecase.execute(&ctx).await.unwrap();

        let mut usecase = RegisterDeviceTokenUseCase {
            user_id: second_user.clone(),
            fcm_token: "shared-phone".to_string(),
            device_type: "IOS".to_string(),
        };
        usecase.execute(&ctx).await.unwrap();

        let first_tokens = ctx
            .repos
            .device_tokens
            .find_by_users(&[first_user])
            .await
            .unwrap();
        assert!(first_tokens.is_empty());
        let second_tokens = ctx
            .repos
            .device_tokens
            .find_by_users(&[second_user])
            .await
            .unwrap();
        assert_eq!(second_tokens.len(), 1);
    }

    #[tokio::test]
    async fn rejects_unknown_device_type() {
        let ctx = setup_context_inmemory();

        let mut usecase = RegisterDeviceTokenUseCase {
            user_id: ID::new(),
            fcm_token: "fcm-token-1".to_string(),
            device_type: "WINDOWS_PHONE".to_string(),
        };
        let err = usecase.execute(&ctx).await.unwrap_err();
        assert_eq!(
            err,
            UseCaseError::InvalidDeviceType("WINDOWS_PHONE".to_string())
        );
    }

    #[tokio::test]
    async fn rejects_blank_token() {
        let ctx = setup_context_inmemory();

        let mut usecase = RegisterDeviceTokenUseCase {
            user_id: ID::new(),
            fcm_token: "  ".to_string(),
            device_type: "ANDROID".to_string(),
        };
        assert_eq!(
            usecase.execute(&ctx).await.unwrap_err(),
            UseCaseError::EmptyToken
        );
    }
}
