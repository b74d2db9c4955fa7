pub const STARTING: &str = "Starting mi-bot...";
pub const POLLING_START: &str = "Starting Telegram polling loop...";
pub const SYNC_LOOP_START: &str = "Starting Matrix sync loop...";
pub const SHUTDOWN: &str = "Shutting down...";

pub fn config_loaded(feeds: usize, targets: usize) -> String {
    format!("Loaded configuration: {feeds} feeds, {targets} broadcast targets")
}

pub fn polling_failed(err: &str) -> String {
    format!("Telegram polling failed, retrying: {err}")
}

pub fn matrix_logged_in(user: &str) -> String {
    format!("Logged in to Matrix as {user}")
}

pub fn invite_received(room_id: &str) -> String {
    format!("💌 Received invite for room {room_id:?}")
}

pub fn shutdown_fail(err: &str) -> String {
    format!("Unable to listen for shutdown signal: {err}")
}

pub fn minkorrekt_mode(enabled: bool) -> String {
    format!("Methodisch inkorrekt commands enabled: {enabled}")
}
