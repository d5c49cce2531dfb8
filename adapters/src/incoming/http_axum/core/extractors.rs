use domain::job::JobId;

/// Malformed ids are reported the same way as unknown ones.
pub fn parse_job_id(raw: &str) -> Option<JobId> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_job_ids_are_rejected() {
        assert!(parse_job_id("not-a-uuid").is_none());

        let id = JobId::new();
        assert_eq!(parse_job_id(&id.to_string()), Some(id));
    }
}
