use crate::models::{CalcSummary, Notice, NoticeKind, Record, SessionInput, Settings, RECORD_COLUMNS};
use crate::session::shop_lines;

pub struct IndexView<'a> {
    pub settings: &'a Settings,
    pub draft: &'a SessionInput,
    pub summary: Option<&'a CalcSummary>,
    pub notice: Option<&'a Notice>,
    pub preview: &'a [Record],
    pub now: &'a str,
}

pub fn render_index(view: &IndexView<'_>) -> String {
    let draft = view.draft;
    let tallies = &draft.tallies;
    let shop_names: Vec<String> = view.settings.shops.keys().cloned().collect();

    let body = INDEX_BODY
        .replace("{{MACHINES}}", &options(&view.settings.machines, &draft.machine))
        .replace("{{SHOPS}}", &options(&shop_names, &draft.shop))
        .replace("{{USERS}}", &options(&view.settings.users, &draft.user))
        .replace("{{DATE}}", &escape(&draft.date))
        .replace("{{NOW}}", &escape(view.now))
        .replace("{{SEAT}}", &escape(&draft.seat))
        .replace("{{PRE_SPINS}}", &draft.pre_spins.to_string())
        .replace("{{PRE_COINS}}", &draft.pre_coins.to_string())
        .replace("{{PRE_BIG}}", &draft.pre_big.to_string())
        .replace("{{PRE_REG}}", &draft.pre_reg.to_string())
        .replace("{{BIG_SUIKA}}", &tallies.big_suika.to_string())
        .replace("{{REG_BITA_SUIKA}}", &tallies.reg_bita_suika.to_string())
        .replace("{{LAMP_COLD}}", &tallies.lamp_cold.to_string())
        .replace("{{LAMP_WARM}}", &tallies.lamp_warm.to_string())
        .replace("{{LAMP_RAINBOW}}", &tallies.lamp_rainbow.to_string())
        .replace("{{BIG_TOP_BLUE}}", &tallies.big_top_blue.to_string())
        .replace("{{BIG_TOP_YELLOW}}", &tallies.big_top_yellow.to_string())
        .replace("{{BIG_TOP_GREEN}}", &tallies.big_top_green.to_string())
        .replace("{{BIG_TOP_RED}}", &tallies.big_top_red.to_string())
        .replace("{{BIG_TOP_RAINBOW}}", &tallies.big_top_rainbow.to_string())
        .replace("{{REG_TOP_BLUE}}", &tallies.reg_top_blue.to_string())
        .replace("{{REG_TOP_YELLOW}}", &tallies.reg_top_yellow.to_string())
        .replace("{{REG_TOP_GREEN}}", &tallies.reg_top_green.to_string())
        .replace("{{REG_TOP_RED}}", &tallies.reg_top_red.to_string())
        .replace("{{REG_TOP_RAINBOW}}", &tallies.reg_top_rainbow.to_string())
        .replace("{{POST_SPINS}}", &draft.post_spins.to_string())
        .replace("{{POST_BIG}}", &draft.post_big.to_string())
        .replace("{{POST_COINS}}", &draft.post_coins.to_string())
        .replace("{{POST_REG}}", &draft.post_reg.to_string())
        .replace("{{SUMMARY}}", &summary_block(view.summary))
        .replace("{{PREVIEW}}", &preview_table(view.preview))
        .replace("{{MEMO}}", &escape(&draft.memo));

    page(view.notice, &body)
}

pub fn render_settings(settings: &Settings, notice: Option<&Notice>) -> String {
    let body = SETTINGS_BODY
        .replace("{{USERS}}", &escape(&settings.users.join("\n")))
        .replace("{{MACHINES}}", &escape(&settings.machines.join("\n")))
        .replace("{{SHOPS}}", &escape(&shop_lines(settings)));
    page(notice, &body)
}

fn page(notice: Option<&Notice>, body: &str) -> String {
    PAGE_HTML
        .replace("{{NOTICE}}", &notice_block(notice))
        .replace("{{BODY}}", body)
}

fn notice_block(notice: Option<&Notice>) -> String {
    match notice {
        Some(notice) => {
            let kind = match notice.kind {
                NoticeKind::Success => "ok",
                NoticeKind::Warning => "warn",
            };
            format!(
                r#"<div class="status" data-type="{kind}">{}</div>"#,
                escape(&notice.message)
            )
        }
        None => String::new(),
    }
}

fn options(values: &[String], selected: &str) -> String {
    values
        .iter()
        .map(|value| {
            let marker = if value == selected { " selected" } else { "" };
            let value = escape(value);
            format!(r#"<option value="{value}"{marker}>{value}</option>"#)
        })
        .collect()
}

fn summary_block(summary: Option<&CalcSummary>) -> String {
    let Some(summary) = summary else {
        return String::new();
    };

    let rows = [
        ("BB確率", summary.big_rate.clone()),
        ("RB確率", summary.reg_rate.clone()),
        ("合算", summary.combined_rate.clone()),
        ("差枚差分", summary.coin_diff.to_string()),
        ("収支", summary.payout.clone()),
        ("回転数", summary.spins.to_string()),
        ("BIG回数", summary.big_count.to_string()),
        ("REG回数", summary.reg_count.to_string()),
    ];
    let items: String = rows
        .iter()
        .map(|(label, value)| {
            format!(
                r#"<div class="stat"><span class="label">{label}</span><span class="value">{}</span></div>"#,
                escape(value)
            )
        })
        .collect();

    format!(
        r#"<details class="summary" open><summary>📊 入力データと計算結果の確認</summary><div class="panel">{items}</div></details>"#
    )
}

fn preview_table(rows: &[Record]) -> String {
    if rows.is_empty() {
        return r#"<p class="hint">記録はまだありません</p>"#.to_string();
    }

    let header: String = RECORD_COLUMNS
        .iter()
        .map(|column| format!("<th>{column}</th>"))
        .collect();
    let body: String = rows
        .iter()
        .map(|row| {
            let cells = [
                row.user.clone(),
                row.date.clone(),
                row.shop.clone(),
                row.machine.clone(),
                row.seat.clone(),
                row.spins.to_string(),
                row.big_count.to_string(),
                row.reg_count.to_string(),
                row.big_rate.clone(),
                row.reg_rate.clone(),
                row.combined_rate.clone(),
                row.coin_diff.to_string(),
                row.payout.clone(),
                row.memo.clone(),
            ];
            let cells: String = cells
                .iter()
                .map(|cell| format!("<td>{}</td>", escape(cell)))
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();

    format!(
        r#"<div class="table-card"><table><thead><tr>{header}</tr></thead><tbody>{body}</tbody></table></div>"#
    )
}

/// HTML-escapes `raw`. Braces are encoded too so values never form a
/// template placeholder.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            _ => out.push(ch),
        }
    }
    out
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>スロット実践記録アプリ</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Hiragino Sans", "Noto Sans JP", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0;
      text-align: center;
      font-size: 1.3rem;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.15rem;
    }

    h3 {
      margin: 8px 0;
      font-size: 0.95rem;
      color: #5f5c57;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 12px 16px;
    }

    label {
      display: grid;
      gap: 4px;
      font-size: 0.85rem;
      color: #6b645d;
    }

    input,
    select,
    textarea {
      font: inherit;
      padding: 8px 10px;
      border-radius: 10px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      background: white;
    }

    textarea {
      min-height: 120px;
      resize: vertical;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(140px, 1fr));
      gap: 12px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 14px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.75rem;
      letter-spacing: 0.08em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.3rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .actions {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 12px;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 14px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      color: white;
      background: var(--accent-2);
    }

    button.primary {
      background: var(--accent);
    }

    button.ghost {
      background: rgba(47, 72, 88, 0.1);
      color: var(--accent-2);
    }

    .status {
      font-size: 0.95rem;
      padding: 10px 14px;
      border-radius: 12px;
    }

    .status[data-type="warn"] {
      color: #8a5a00;
      background: #fff3cd;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
      background: #e3f4e9;
    }

    .table-card {
      overflow-x: auto;
      background: white;
      border-radius: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    table {
      border-collapse: collapse;
      width: 100%;
      font-size: 0.85rem;
    }

    th,
    td {
      padding: 8px 10px;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
      white-space: nowrap;
      text-align: left;
    }

    .hint {
      margin: 0;
      color: #6f6a65;
      font-size: 0.9rem;
    }

    @media (max-width: 600px) {
      .app {
        padding: 24px 18px;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    {{NOTICE}}
    {{BODY}}
  </main>
</body>
</html>
"#;

const INDEX_BODY: &str = r#"<form method="post" action="/settings/open">
      <button class="ghost" type="submit">🔧 設定画面を表示</button>
    </form>

    <h1>スロット実践記録アプリ</h1>

    <form id="session" method="post" action="/calculate">
      <section>
        <h2>◆基本データ</h2>
        <div class="grid">
          <label>使用機種<select name="machine">{{MACHINES}}</select></label>
          <label>店舗<select name="shop">{{SHOPS}}</select></label>
          <label>ユーザー名<select name="user">{{USERS}}</select></label>
          <label>日付<input type="date" name="date" value="{{DATE}}" /></label>
        </div>
        <p class="hint">現在時刻: {{NOW}}</p>
      </section>

      <section>
        <h2>🔷 実践前データ</h2>
        <div class="grid">
          <label>台番号<input type="text" name="seat" value="{{SEAT}}" /></label>
          <label>回転数（前）<input type="number" min="0" name="pre_spins" value="{{PRE_SPINS}}" /></label>
          <label>差枚数（前）<input type="number" name="pre_coins" value="{{PRE_COINS}}" /></label>
          <label>BIG回数（前）<input type="number" min="0" name="pre_big" value="{{PRE_BIG}}" /></label>
          <label>REG回数（前）<input type="number" min="0" name="pre_reg" value="{{PRE_REG}}" /></label>
        </div>
      </section>

      <section>
        <h2>🔶 実践中データ</h2>
        <div class="grid">
          <div>
            <h3>🎰 BIG中</h3>
            <label>スイカ数<input type="number" min="0" name="big_suika" value="{{BIG_SUIKA}}" /></label>
          </div>
          <div>
            <h3>🎯 REG中</h3>
            <label>ビタ押しスイカ数<input type="number" min="0" name="reg_bita_suika" value="{{REG_BITA_SUIKA}}" /></label>
            <h3>🌈 サイドランプ</h3>
            <label>❄️ 寒色<input type="number" min="0" name="lamp_cold" value="{{LAMP_COLD}}" /></label>
            <label>🔥 暖色<input type="number" min="0" name="lamp_warm" value="{{LAMP_WARM}}" /></label>
            <label>🌈 虹<input type="number" min="0" name="lamp_rainbow" value="{{LAMP_RAINBOW}}" /></label>
          </div>
        </div>
        <h3>トップパネル</h3>
        <div class="grid">
          <div>
            <label>🔵 青 (BIG中)<input type="number" min="0" name="big_top_blue" value="{{BIG_TOP_BLUE}}" /></label>
            <label>🟡 黄 (BIG中)<input type="number" min="0" name="big_top_yellow" value="{{BIG_TOP_YELLOW}}" /></label>
            <label>🟢 緑 (BIG中)<input type="number" min="0" name="big_top_green" value="{{BIG_TOP_GREEN}}" /></label>
            <label>🔴 赤 (BIG中)<input type="number" min="0" name="big_top_red" value="{{BIG_TOP_RED}}" /></label>
            <label>🌈 虹 (BIG中)<input type="number" min="0" name="big_top_rainbow" value="{{BIG_TOP_RAINBOW}}" /></label>
          </div>
          <div>
            <label>🔵 青 (REG中)<input type="number" min="0" name="reg_top_blue" value="{{REG_TOP_BLUE}}" /></label>
            <label>🟡 黄 (REG中)<input type="number" min="0" name="reg_top_yellow" value="{{REG_TOP_YELLOW}}" /></label>
            <label>🟢 緑 (REG中)<input type="number" min="0" name="reg_top_green" value="{{REG_TOP_GREEN}}" /></label>
            <label>🔴 赤 (REG中)<input type="number" min="0" name="reg_top_red" value="{{REG_TOP_RED}}" /></label>
            <label>🌈 虹 (REG中)<input type="number" min="0" name="reg_top_rainbow" value="{{REG_TOP_RAINBOW}}" /></label>
          </div>
        </div>
        <label>メモ<textarea name="memo">{{MEMO}}</textarea></label>
      </section>

      <section>
        <h2>終了時</h2>
        <div class="grid">
          <label>回転数<input type="number" min="0" name="post_spins" value="{{POST_SPINS}}" /></label>
          <label>差枚数<input type="number" name="post_coins" value="{{POST_COINS}}" /></label>
          <label>BIG回数<input type="number" min="0" name="post_big" value="{{POST_BIG}}" /></label>
          <label>REG回数<input type="number" min="0" name="post_reg" value="{{POST_REG}}" /></label>
        </div>
      </section>

      <section class="actions">
        <button class="primary" type="submit" formaction="/calculate">✨ 計算する</button>
        <button type="submit" formaction="/record">💾 記録する</button>
      </section>
    </form>

    {{SUMMARY}}

    <form method="post" action="/delete-latest">
      <button class="ghost" type="submit">🗑️ 最新の記録を削除</button>
    </form>

    <section>
      <h2>📋 記録一覧</h2>
      {{PREVIEW}}
    </section>"#;

const SETTINGS_BODY: &str = r#"<h1>🔧 設定編集画面</h1>

    <form method="post" action="/settings">
      <div class="grid">
        <label>ユーザー（1行に1件）<textarea name="users">{{USERS}}</textarea></label>
        <label>機種（1行に1件）<textarea name="machines">{{MACHINES}}</textarea></label>
      </div>
      <label>店舗（店舗名,換金率,買値,台数）<textarea name="shops">{{SHOPS}}</textarea></label>
      <section class="actions">
        <button class="primary" type="submit">💾 設定を保存</button>
      </section>
    </form>

    <form method="post" action="/settings/close">
      <button class="ghost" type="submit">← 記録画面に戻る</button>
    </form>"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> SessionInput {
        SessionInput {
            user: "default_user".to_string(),
            seat: "127".to_string(),
            memo: "<b>{{SEAT}}</b>".to_string(),
            post_spins: 1500,
            ..SessionInput::default()
        }
    }

    #[test]
    fn index_keeps_draft_values_and_escapes_memo() {
        let settings = Settings::default();
        let draft = draft();
        let html = render_index(&IndexView {
            settings: &settings,
            draft: &draft,
            summary: None,
            notice: Some(&Notice::warning("先に計算を実行してください")),
            preview: &[],
            now: "12:00:00",
        });

        assert!(html.contains(r#"name="seat" value="127""#));
        assert!(html.contains(r#"name="post_spins" value="1500""#));
        assert!(html.contains("&lt;b&gt;&#123;&#123;SEAT}}&lt;/b&gt;"));
        assert!(html.contains(r#"data-type="warn""#));
        assert!(html.contains("記録はまだありません"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn settings_page_lists_shops() {
        let html = render_settings(&Settings::default(), None);
        assert!(html.contains("サンシャイン豊見城店,17.85,21.74,60"));
        assert!(html.contains(r#"action="/settings/close""#));
    }
}
