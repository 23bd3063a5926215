quantity!(Hours, "h", precision: 2);

impl Hours {
    /// Whole minutes, for clock-face rendering.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn total_minutes(self) -> i64 {
        (self.0 * 60.0).round() as i64
    }
}
