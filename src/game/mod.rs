pub mod scheduler;
pub mod score_store;
pub mod session;

pub use scheduler::{ManualScheduler, TickScheduler, TimerHandle};
pub use score_store::{ScoreStore, MAX_LEADERBOARD_ENTRIES};
pub use session::SessionController;

#[cfg(test)]
pub mod tests {
    use std::sync::Once;
    use test_context::TestContext;

    static INIT_LOGGER: Once = Once::new();

    pub struct UsingLogger {
        _value: String,
    }

    impl TestContext for UsingLogger {
        fn setup() -> UsingLogger {
            INIT_LOGGER.call_once(|| {
                env_logger::init();
            });

            UsingLogger {
                _value: "Hello, World!".to_string(),
            }
        }

        fn teardown(self) {
            // Perform any teardown you wish.
        }
    }
}
