#[cfg(test)]
mod tests {
    use crate::models::{OptionTally, WeeklyVote};
    use crate::report::{MonthlyReport, NO_MONTHLY_VOTES, NO_WEEKLY_VOTES};
    use crate::scoring::{rank_sorted, Leaderboard, PointTable};
    use crate::validation::{
        parse_weekday, validate_poll, validate_secret, validate_time_of_day, validate_utc_offset, ValidationError,
    };
    use time::Weekday;

    fn votes(pairs: &[(&str, i64)]) -> Vec<WeeklyVote> {
        pairs.iter()
            .map(|(username, sort_order)| WeeklyVote { username: username.to_string(), sort_order: *sort_order })
            .collect()
    }

    fn options(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    fn scores(board: &Leaderboard) -> Vec<(usize, &str, u32)> {
        board.entries().iter().map(|e| (e.rank, e.username.as_str(), e.score)).collect()
    }

    #[test]
    fn test_point_table_lookup() {
        let table = PointTable::default();
        assert_eq!(table.points_for(0), 5);
        assert_eq!(table.points_for(1), 3);
        assert_eq!(table.points_for(2), 2);
        assert_eq!(table.points_for(3), 1);
        assert_eq!(table.points_for(4), 0);
        assert_eq!(table.points_for(5), 0);
        assert_eq!(table.points_for(-1), 0);
    }

    #[test]
    fn test_repeat_voter_accumulates() {
        let board = Leaderboard::from_votes(&votes(&[("A", 0), ("A", 0), ("B", 1)]), &PointTable::default());
        assert_eq!(scores(&board), vec![(1, "A", 10), (2, "B", 3)]);
        assert_eq!(board.to_string(), "🏆 Weekly leaderboard:\n1. A - 10p\n2. B - 3p");
    }

    #[test]
    fn test_tie_skips_rank() {
        let board = Leaderboard::from_votes(&votes(&[("A", 0), ("B", 0), ("C", 1)]), &PointTable::default());
        assert_eq!(scores(&board), vec![(1, "A", 5), (1, "B", 5), (3, "C", 3)]);
    }

    #[test]
    fn test_sports_ranking_sequence() {
        let ranked = rank_sorted(vec![
            ("a".into(), 9),
            ("b".into(), 7),
            ("c".into(), 7),
            ("d".into(), 4),
            ("e".into(), 4),
            ("f".into(), 4),
            ("g".into(), 1),
        ]);
        let ranks: Vec<usize> = ranked.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 2, 4, 4, 4, 7]);
    }

    #[test]
    fn test_zero_point_voters_are_listed() {
        let board = Leaderboard::from_votes(&votes(&[("A", 4), ("B", 7)]), &PointTable::default());
        assert_eq!(scores(&board), vec![(1, "A", 0), (1, "B", 0)]);
    }

    #[test]
    fn test_custom_point_table() {
        let table = PointTable::new(vec![2, 1, 0]);
        let board = Leaderboard::from_votes(&votes(&[("A", 2), ("B", 1), ("B", 1), ("C", 0)]), &table);
        assert_eq!(scores(&board), vec![(1, "B", 2), (1, "C", 2), (3, "A", 0)]);
    }

    #[test]
    fn test_empty_reports_render_sentinels() {
        let board = Leaderboard::from_votes(&[], &PointTable::default());
        assert!(board.is_empty());
        assert_eq!(board.to_string(), NO_WEEKLY_VOTES);
        assert_eq!(MonthlyReport::default().to_string(), NO_MONTHLY_VOTES);
    }

    #[test]
    fn test_monthly_report_rendering() {
        let report = MonthlyReport::new(vec![
            OptionTally { text: "0 mistakes".into(), votes: 4 },
            OptionTally { text: "2 mistakes".into(), votes: 1 },
        ]);
        assert_eq!(report.total_votes(), 5);
        assert_eq!(
            report.to_string(),
            "📊 Monthly poll stats for this channel:\n0 mistakes: 4 votes\n2 mistakes: 1 votes"
        );
    }

    #[test]
    fn test_poll_validation() {
        let five = options(&["0", "1", "2", "3", "4+"]);
        assert!(validate_poll("How many mistakes?", &five, &PointTable::default()).is_ok());

        assert_eq!(
            validate_poll("  ", &five, &PointTable::default()),
            Err(ValidationError::EmptyQuestion)
        );
        assert_eq!(
            validate_poll("Q", &options(&["only"]), &PointTable::new(vec![1])),
            Err(ValidationError::TooFewOptions)
        );
        assert_eq!(
            validate_poll("Q", &options(&["Yes", "yes"]), &PointTable::new(vec![1, 0])),
            Err(ValidationError::DuplicateOption("yes".into()))
        );
        assert_eq!(
            validate_poll("Q", &options(&["a", ""]), &PointTable::new(vec![1, 0])),
            Err(ValidationError::EmptyOption)
        );
        assert_eq!(
            validate_poll("Q", &options(&["a", "b", "c"]), &PointTable::default()),
            Err(ValidationError::PointTableMismatch { points: 5, options: 3 })
        );
        assert_eq!(
            validate_poll("Q", &options(&["a", "b"]), &PointTable::new(vec![1, 3])),
            Err(ValidationError::PointTableNotDescending)
        );
    }

    #[test]
    fn test_schedule_validation() {
        assert!(validate_time_of_day(0, 0).is_ok());
        assert!(validate_time_of_day(23, 59).is_ok());
        assert_eq!(validate_time_of_day(24, 0), Err(ValidationError::InvalidHour(24)));
        assert_eq!(validate_time_of_day(8, 60), Err(ValidationError::InvalidMinute(60)));
        assert!(validate_utc_offset(3).is_ok());
        assert_eq!(validate_utc_offset(15), Err(ValidationError::InvalidUtcOffset(15)));
    }

    #[test]
    fn test_weekday_parsing() {
        assert_eq!(parse_weekday("Sunday"), Ok(Weekday::Sunday));
        assert_eq!(parse_weekday("fri"), Ok(Weekday::Friday));
        assert!(matches!(parse_weekday("someday"), Err(ValidationError::InvalidWeekday(_))));
    }

    #[test]
    fn test_secret_validation() {
        assert!(validate_secret("s3cret_token-01").is_ok());
        assert_eq!(validate_secret(""), Err(ValidationError::MissingWebhookSecret));
        assert_eq!(validate_secret("has space"), Err(ValidationError::InvalidWebhookSecret));
        assert_eq!(validate_secret(&"a".repeat(257)), Err(ValidationError::InvalidWebhookSecret));
    }
}
