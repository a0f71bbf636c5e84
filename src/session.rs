use crate::models::{CalcSummary, Notice, Record, SessionInput, Settings, SettingsForm, Shop};
use crate::stats::{format_payout, format_rate, rates};
use chrono::Local;
use serde::Serialize;

pub const MISSING_DATA: &str = "計算に必要なデータが不足しています";
pub const REQUIRED_FIELDS: &str = "台番号、終了時回転数、BIG回数、REG回数は必須です";
pub const CALCULATE_FIRST: &str = "先に計算を実行してください";
pub const UNKNOWN_SHOP: &str = "店舗が設定に存在しません";
pub const RECORD_SAVED: &str = "記録を保存しました";
pub const RECORD_DELETED: &str = "最新の記録を削除しました";
pub const NOTHING_TO_DELETE: &str = "削除する記録がありません";
pub const SETTINGS_SAVED: &str = "設定を保存しました";
pub const SETTINGS_INCOMPLETE: &str = "ユーザー・機種・店舗はそれぞれ1件以上必要です";
pub const SHOP_LINE_INVALID: &str = "店舗は「店舗名,換金率,買値,台数」の形式で入力してください";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UiMode {
    #[default]
    Normal,
    SettingsEdit,
}

impl UiMode {
    pub fn open_settings(self) -> Self {
        UiMode::SettingsEdit
    }

    pub fn close_settings(self) -> Self {
        UiMode::Normal
    }
}

/// Per-process form state between requests.
#[derive(Debug, Default)]
pub struct SessionState {
    pub mode: UiMode,
    pub draft: Option<SessionInput>,
    pub staged: Option<CalcSummary>,
    pub notice: Option<Notice>,
}

impl SessionState {
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}

/// Derives the summary for a filled-in form. Totals add the pre-session
/// meter to the post-session meter; the coin difference is post minus pre.
pub fn calculate(input: &SessionInput, settings: &Settings) -> Result<CalcSummary, Notice> {
    let shop = settings
        .shop(&input.shop)
        .ok_or_else(|| Notice::warning(UNKNOWN_SHOP))?;

    let total_games = input.pre_spins.saturating_add(input.post_spins);
    let total_big = input.pre_big.saturating_add(input.post_big);
    let total_reg = input.pre_reg.saturating_add(input.post_reg);
    let coin_diff = input.post_coins.saturating_sub(input.pre_coins);
    let payout = coin_diff as f64 * shop.exchange_rate;

    let result = rates(total_games, total_big, total_reg);
    let (Some(big), Some(reg), Some(combined)) = (result.big, result.reg, result.combined) else {
        return Err(Notice::warning(MISSING_DATA));
    };

    Ok(CalcSummary {
        big_rate: format_rate(big),
        reg_rate: format_rate(reg),
        combined_rate: format_rate(combined),
        coin_diff,
        payout: format_payout(payout),
        spins: input.post_spins,
        big_count: input.post_big,
        reg_count: input.post_reg,
    })
}

/// Merges the submitted form with the staged summary. A blank date is
/// recorded as today.
pub fn build_record(input: &SessionInput, staged: Option<&CalcSummary>) -> Result<Record, Notice> {
    if input.seat.trim().is_empty()
        || input.post_spins == 0
        || input.post_big == 0
        || input.post_reg == 0
    {
        return Err(Notice::warning(REQUIRED_FIELDS));
    }
    let summary = staged.ok_or_else(|| Notice::warning(CALCULATE_FIRST))?;

    Ok(Record {
        user: input.user.clone(),
        date: record_date(&input.date),
        shop: input.shop.clone(),
        machine: input.machine.clone(),
        seat: input.seat.trim().to_string(),
        spins: input.post_spins,
        big_count: input.post_big,
        reg_count: input.post_reg,
        big_rate: summary.big_rate.clone(),
        reg_rate: summary.reg_rate.clone(),
        combined_rate: summary.combined_rate.clone(),
        coin_diff: summary.coin_diff,
        payout: summary.payout.clone(),
        memo: input.memo.clone(),
    })
}

fn record_date(submitted: &str) -> String {
    let submitted = submitted.trim();
    if submitted.is_empty() {
        return Local::now().date_naive().to_string();
    }
    submitted.to_string()
}

/// Parses the settings editor. Users and machines are one per line; shops
/// are `name,rate,buyRate,units` per line.
pub fn parse_settings_form(form: &SettingsForm) -> Result<Settings, Notice> {
    let users = non_blank_lines(&form.users);
    let machines = non_blank_lines(&form.machines);

    let mut shops = indexmap::IndexMap::new();
    for line in non_blank_lines(&form.shops) {
        let (name, shop) = parse_shop_line(&line).ok_or_else(|| Notice::warning(SHOP_LINE_INVALID))?;
        shops.insert(name, shop);
    }

    if users.is_empty() || machines.is_empty() || shops.is_empty() {
        return Err(Notice::warning(SETTINGS_INCOMPLETE));
    }

    Ok(Settings {
        users,
        machines,
        shops,
    })
}

fn non_blank_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_shop_line(line: &str) -> Option<(String, Shop)> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    let [name, rate, buy_rate, units] = parts.as_slice() else {
        return None;
    };
    if name.is_empty() {
        return None;
    }

    Some((
        name.to_string(),
        Shop {
            exchange_rate: rate.parse().ok()?,
            buy_rate: buy_rate.parse().ok()?,
            unit_count: units.parse().ok()?,
        },
    ))
}

/// Inverse of the shop lines accepted by [`parse_settings_form`].
pub fn shop_lines(settings: &Settings) -> String {
    settings
        .shops
        .iter()
        .map(|(name, shop)| {
            format!(
                "{name},{},{},{}",
                shop.exchange_rate, shop.buy_rate, shop.unit_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
