use super::models::{GameOutcome, RoundResult, StreakCounters};

impl StreakCounters {
    /// A win extends the win streak and breaks the loss streak
    pub fn record_win(&mut self) {
        self.current_loss = 0;
        self.current_win += 1;
        self.longest_win = self.longest_win.max(self.current_win);
    }

    /// A loss extends the loss streak and breaks the win streak
    pub fn record_loss(&mut self) {
        self.current_win = 0;
        self.current_loss += 1;
        self.longest_loss = self.longest_loss.max(self.current_loss);
    }

    /// A draw breaks both streaks
    pub fn record_draw(&mut self) {
        self.reconcile();
        self.current_win = 0;
        self.current_loss = 0;
    }

    pub fn apply_round(mut self, result: RoundResult) -> Self {
        match result {
            RoundResult::Win => self.record_win(),
            RoundResult::Lose => self.record_loss(),
        }
        self
    }

    pub fn apply_game(mut self, outcome: GameOutcome) -> Self {
        match outcome {
            GameOutcome::Win => self.record_win(),
            GameOutcome::Lose => self.record_loss(),
            GameOutcome::Draw => self.record_draw(),
        }
        self
    }

    /// Raises the longest streaks to at least the current ones
    pub fn reconcile(&mut self) {
        self.longest_win = self.longest_win.max(self.current_win);
        self.longest_loss = self.longest_loss.max(self.current_loss);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn counters(
        current_win: i64,
        current_loss: i64,
        longest_win: i64,
        longest_loss: i64,
    ) -> StreakCounters {
        StreakCounters {
            current_win,
            current_loss,
            longest_win,
            longest_loss,
        }
    }

    #[test]
    fn loss_after_three_wins_resets_win_streak() {
        let streaks = StreakCounters::default()
            .apply_round(RoundResult::Win)
            .apply_round(RoundResult::Win)
            .apply_round(RoundResult::Win)
            .apply_round(RoundResult::Lose);

        assert_eq!(streaks, counters(0, 1, 3, 1));
    }

    #[rstest]
    #[case::win_extends(counters(2, 0, 2, 4), GameOutcome::Win, counters(3, 0, 3, 4))]
    #[case::win_breaks_loss(counters(0, 3, 1, 3), GameOutcome::Win, counters(1, 0, 1, 3))]
    #[case::loss_below_longest(counters(0, 1, 5, 4), GameOutcome::Lose, counters(0, 2, 5, 4))]
    #[case::loss_raises_longest(counters(0, 4, 5, 4), GameOutcome::Lose, counters(0, 5, 5, 5))]
    #[case::draw_resets_both(counters(2, 0, 2, 1), GameOutcome::Draw, counters(0, 0, 2, 1))]
    #[case::draw_reconciles_stale_longest(counters(3, 0, 1, 0), GameOutcome::Draw, counters(0, 0, 3, 0))]
    fn game_outcomes_update_streaks(
        #[case] before: StreakCounters,
        #[case] outcome: GameOutcome,
        #[case] expected: StreakCounters,
    ) {
        assert_eq!(before.apply_game(outcome), expected);
    }

    #[test]
    fn longest_never_drops_below_current() {
        let mut streaks = StreakCounters::default();
        let sequence = [
            RoundResult::Win,
            RoundResult::Lose,
            RoundResult::Lose,
            RoundResult::Win,
            RoundResult::Win,
            RoundResult::Win,
            RoundResult::Lose,
        ];

        for result in sequence {
            streaks = streaks.apply_round(result);
            assert!(streaks.longest_win >= streaks.current_win);
            assert!(streaks.longest_loss >= streaks.current_loss);
        }

        assert_eq!(streaks, counters(0, 1, 3, 2));
    }
}
