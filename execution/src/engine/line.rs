use rosistrat_types::{
    LineConfig, LineOutcome, LineState, Pocket, Progression, Result, FIBONACCI,
};

/// A bet line driven by a configured progression.
///
/// Shared by Compound Martingale and Safe Compound Martingale.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressionLine {
    pub state: LineState,
    pub progression: Progression,
    pub custom: Vec<f64>,
    pub reset_on_win: bool,
    pub max_bet: Option<f64>,
    /// Position in the fibonacci or custom sequence.
    pub step: usize,
}

impl ProgressionLine {
    pub fn from_config(config: &LineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: LineState::new(config.id.clone(), config.spec()?, config.initial_bet),
            progression: config.progression,
            custom: config.custom_steps().to_vec(),
            reset_on_win: config.reset_on_win,
            max_bet: config.max_bet,
            step: 0,
        })
    }

    /// Stakes the current bet against `pocket` and advances the progression.
    ///
    /// Returns the line's outcome and its profit.
    pub fn play(&mut self, pocket: &Pocket) -> (LineOutcome, f64) {
        let stake = self.state.current_bet;
        let won = self.state.spec.bet.wins(pocket);
        let profit = self.state.settle(won);
        self.state.is_paused = false;
        self.advance(won);
        (LineOutcome::placed(&self.state.id, stake, won), profit)
    }

    /// Marks the line as sitting this spin out; its stake is left untouched.
    pub fn pause(&mut self) -> LineOutcome {
        self.state.is_paused = true;
        LineOutcome::paused(&self.state.id)
    }

    fn advance(&mut self, won: bool) {
        if won {
            self.state.loss_streak = 0;
            if self.reset_on_win {
                self.step = 0;
                self.state.current_bet = self.state.initial_bet;
            }
            return;
        }

        self.state.loss_streak += 1;
        let initial = self.state.initial_bet;
        let next = match self.progression {
            Progression::Flat => initial,
            Progression::Martingale => self.state.current_bet * 2.0,
            Progression::Fibonacci => {
                self.step = (self.step + 1).min(FIBONACCI.len() - 1);
                initial * FIBONACCI[self.step]
            }
            Progression::Dalembert => self.state.current_bet + initial,
            Progression::Custom => {
                self.step = (self.step + 1).min(self.custom.len().saturating_sub(1));
                self.custom.get(self.step).copied().unwrap_or(initial)
            }
        };
        self.state.current_bet = match self.max_bet {
            Some(cap) => next.min(cap),
            None => next,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosistrat_types::{compound_lines, pocket, BetType};

    fn line(progression: Progression) -> ProgressionLine {
        let config = LineConfig::new(
            "black",
            "Black",
            10.0,
            BetType::Color,
            "black",
            2.0,
            progression,
        );
        ProgressionLine::from_config(&config).unwrap()
    }

    fn lose(line: &mut ProgressionLine, times: usize) -> Vec<f64> {
        // 1 is red
        let red = pocket(1).unwrap();
        (0..times)
            .map(|_| {
                line.play(red);
                line.state.current_bet
            })
            .collect()
    }

    #[test]
    fn test_progressions() {
        assert_eq!(lose(&mut line(Progression::Flat), 3), [10.0, 10.0, 10.0]);
        assert_eq!(lose(&mut line(Progression::Martingale), 3), [20.0, 40.0, 80.0]);
        assert_eq!(lose(&mut line(Progression::Dalembert), 3), [20.0, 30.0, 40.0]);
        assert_eq!(
            lose(&mut line(Progression::Fibonacci), 5),
            [10.0, 20.0, 30.0, 50.0, 80.0]
        );
    }

    #[test]
    fn test_fibonacci_holds_at_end() {
        let mut fib = line(Progression::Fibonacci);
        let bets = lose(&mut fib, 20);
        assert_eq!(bets[bets.len() - 1], 1440.0);
        assert_eq!(bets[bets.len() - 2], 1440.0);
    }

    #[test]
    fn test_custom_progression_clamps() {
        let mut zero = ProgressionLine::from_config(&compound_lines()[0]).unwrap();
        let bets = lose(&mut zero, 12);
        assert_eq!(&bets[..3], [2.0, 3.0, 4.0]);
        assert_eq!(bets[11], 10.0);

        // Win on zero resets
        let (outcome, profit) = zero.play(pocket(0).unwrap());
        assert!(outcome.won);
        assert_eq!(profit, 10.0 * 35.0);
        assert_eq!(zero.state.current_bet, 1.0);
        assert_eq!(zero.step, 0);
    }

    #[test]
    fn test_win_without_reset_keeps_bet() {
        let mut black = line(Progression::Martingale);
        black.reset_on_win = false;
        lose(&mut black, 2);
        let (outcome, profit) = black.play(pocket(2).unwrap());
        assert!(outcome.won);
        assert_eq!(outcome.bet, 40.0);
        assert_eq!(profit, 40.0);
        assert_eq!(black.state.current_bet, 40.0);
        assert_eq!(black.state.loss_streak, 0);
    }

    #[test]
    fn test_max_bet_caps_progression() {
        let mut black = line(Progression::Martingale);
        black.max_bet = Some(50.0);
        assert_eq!(lose(&mut black, 4), [20.0, 40.0, 50.0, 50.0]);
    }

    #[test]
    fn test_totals() {
        let mut black = line(Progression::Martingale);
        lose(&mut black, 2);
        black.play(pocket(2).unwrap());
        assert_eq!(black.state.total_wagered, 70.0);
        assert_eq!(black.state.total_won, 80.0);
        assert_eq!(black.state.net_result(), 10.0);
    }
}
