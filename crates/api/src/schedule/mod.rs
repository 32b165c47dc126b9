mod create_quick_schedule;
pub mod subscribers;

pub use create_quick_schedule::CreateQuickScheduleUseCase;
