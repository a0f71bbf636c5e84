use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt::Display, str::FromStr};

pub const DEFAULT_USER: &str = "default_user";
pub const DEFAULT_MACHINE: &str = "ハナハナホウオウ〜天翔〜";
pub const DEFAULT_SHOP: &str = "サンシャイン豊見城店";

/// Header of the record table, in column order.
pub const RECORD_COLUMNS: [&str; 14] = [
    "ユーザー",
    "日付",
    "店舗",
    "機種",
    "台番号",
    "回転数",
    "BIG回数",
    "REG回数",
    "BB確率",
    "RB確率",
    "合算",
    "差枚差分",
    "収支",
    "メモ",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    #[serde(rename = "rate", alias = "換金率")]
    pub exchange_rate: f64,
    #[serde(rename = "buyRate", alias = "買値")]
    pub buy_rate: f64,
    #[serde(rename = "units", alias = "台数")]
    pub unit_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub users: Vec<String>,
    pub machines: Vec<String>,
    /// Kept in document order; the first shop is the form default.
    pub shops: IndexMap<String, Shop>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut shops = IndexMap::new();
        shops.insert(
            DEFAULT_SHOP.to_string(),
            Shop {
                exchange_rate: 17.85,
                buy_rate: 21.74,
                unit_count: 60,
            },
        );
        Self {
            users: vec![DEFAULT_USER.to_string()],
            machines: vec![DEFAULT_MACHINE.to_string()],
            shops,
        }
    }
}

impl Settings {
    pub fn shop(&self, name: &str) -> Option<&Shop> {
        self.shops.get(name)
    }

    /// Returns `selected` when the list contains it, otherwise the first entry.
    pub fn pick_user<'a>(&'a self, selected: &'a str) -> &'a str {
        pick(&self.users, selected)
    }

    pub fn pick_machine<'a>(&'a self, selected: &'a str) -> &'a str {
        pick(&self.machines, selected)
    }

    pub fn pick_shop<'a>(&'a self, selected: &'a str) -> &'a str {
        if self.shops.contains_key(selected) {
            return selected;
        }
        self.shops.keys().next().map(String::as_str).unwrap_or("")
    }
}

fn pick<'a>(options: &'a [String], selected: &'a str) -> &'a str {
    if options.iter().any(|option| option == selected) {
        return selected;
    }
    options.first().map(String::as_str).unwrap_or("")
}

/// One row of the record table. Fields are stored positionally in
/// [`RECORD_COLUMNS`] order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub user: String,
    pub date: String,
    pub shop: String,
    pub machine: String,
    pub seat: String,
    pub spins: u64,
    pub big_count: u64,
    pub reg_count: u64,
    pub big_rate: String,
    pub reg_rate: String,
    pub combined_rate: String,
    pub coin_diff: i64,
    pub payout: String,
    pub memo: String,
}

/// Derived values staged by "calculate" and consumed by "record".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcSummary {
    pub big_rate: String,
    pub reg_rate: String,
    pub combined_rate: String,
    pub coin_diff: i64,
    pub payout: String,
    pub spins: u64,
    pub big_count: u64,
    pub reg_count: u64,
}

/// Mid-session counters shown on the form. Never used in calculations.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Tallies {
    #[serde(default, deserialize_with = "blank_as_default")]
    pub big_suika: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub reg_bita_suika: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub lamp_cold: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub lamp_warm: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub lamp_rainbow: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub big_top_blue: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub big_top_yellow: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub big_top_green: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub big_top_red: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub big_top_rainbow: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub reg_top_blue: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub reg_top_yellow: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub reg_top_green: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub reg_top_red: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub reg_top_rainbow: u64,
}

/// Everything the session form submits.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SessionInput {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub machine: String,
    #[serde(default)]
    pub shop: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub seat: String,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub pre_spins: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub pre_coins: i64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub pre_big: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub pre_reg: u64,
    #[serde(flatten)]
    pub tallies: Tallies,
    #[serde(default)]
    pub memo: String,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub post_spins: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub post_big: u64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub post_coins: i64,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub post_reg: u64,
}

/// Browsers submit cleared number inputs as empty strings.
fn blank_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: Display,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse().map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub users: String,
    #[serde(default)]
    pub machines: String,
    #[serde(default)]
    pub shops: String,
}

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    pub user: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Warning,
}

/// One-shot message shown on the next page render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
        }
    }
}
