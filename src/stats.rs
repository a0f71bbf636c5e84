/// Games per bonus for BIG, REG and both combined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    pub big: Option<f64>,
    pub reg: Option<f64>,
    pub combined: Option<f64>,
}

/// Hit rates as `games / wins`. A zero denominator, or zero games, yields `None`.
pub fn rates(games: u64, big_wins: u64, reg_wins: u64) -> Rates {
    if games == 0 {
        return Rates {
            big: None,
            reg: None,
            combined: None,
        };
    }

    let per = |wins: u64| (wins != 0).then(|| games as f64 / wins as f64);
    Rates {
        big: per(big_wins),
        reg: per(reg_wins),
        combined: per(big_wins.saturating_add(reg_wins)),
    }
}

pub fn format_rate(rate: f64) -> String {
    format!("{rate:.1}")
}

pub fn format_payout(amount: f64) -> String {
    format!("約 {amount:.0}円")
}
