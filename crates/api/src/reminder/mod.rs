mod send_daily_reminders;

pub use send_daily_reminders::SendDailyRemindersUseCase;
