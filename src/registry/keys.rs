/// Key of the dedup guard for `user`.
pub fn active_job_key(user: &str) -> String {
    format!("active_job:{user}")
}

/// Key of the cancellation flag for `job`.
pub fn cancelled_key(job: &str) -> String {
    format!("cancelled:{job}")
}
