mod delete_device_token;
mod register_device_token;

pub use delete_device_token::DeleteDeviceTokenUseCase;
pub use register_device_token::RegisterDeviceTokenUseCase;
