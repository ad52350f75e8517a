use chrono::Local;

#[inline]
pub fn current_timestamp() -> u64 {
    Local::now().timestamp() as u64
}
