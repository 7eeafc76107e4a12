// Dory: Terminal front end
//
// Line-oriented rendition of the gate and the dashboard. All state lives in
// the `Vault`; this module only reads lines, calls transitions and prints.
// Generic over the reader and writer so whole sessions can be scripted.

use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::error::DoryError;
use crate::gate::{AuthOutcome, Authenticator, Symbol, PATTERN_LEN};
use crate::session::RecordView;
use crate::store::{RecordFields, RecordStore};
use crate::sync::RefreshOutcome;
use crate::vault::{Vault, VaultError};

const GRID_COLUMNS: usize = 5;

const DASHBOARD_HELP: &str = "Commands: list | new | edit <id> | delete <id> | panic | refresh | logout | quit";
const EDITOR_HELP: &str =
    "Enter keeps the shown value, `-` clears it, `.` cancels. A leading `\\` is dropped, so `\\-` and `\\.` enter those literally.";
const GATE_HELP: &str = "Pick symbols by number (or type them), then `enter`. `reset` starts over, `quit` exits.";

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// One token typed at the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Pick {
    /// Zero-based position in the presented grid.
    Position(usize),
    Symbol(Symbol),
}

/// Split a gate line into picks. Numbers are 1-based grid positions.
pub(crate) fn parse_picks(line: &str) -> Vec<Pick> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|token| match token.parse::<usize>() {
            Ok(n) if n >= 1 => Pick::Position(n - 1),
            _ => Pick::Symbol(Symbol::from(token)),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    List,
    New,
    /// Record id as typed; resolved against the loaded records.
    Edit(String),
    Delete(String),
    Panic,
    Refresh,
    Logout,
    Quit,
    Help,
    Unknown(String),
}

pub(crate) fn parse_command(line: &str) -> Command {
    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(str::to_string);

    match (verb.as_str(), arg) {
        ("list" | "ls" | "", _) => Command::List,
        ("new" | "add", _) => Command::New,
        ("edit", Some(id)) => Command::Edit(id),
        ("delete" | "rm", Some(id)) => Command::Delete(id),
        ("panic", _) => Command::Panic,
        ("refresh", _) => Command::Refresh,
        ("logout", _) => Command::Logout,
        ("quit" | "exit" | "q", _) => Command::Quit,
        ("help" | "?", _) => Command::Help,
        _ => Command::Unknown(line.trim().to_string()),
    }
}

/// Interpret one editor line against the field's current value. `None`
/// cancels the edit.
pub(crate) fn parse_field(line: &str, current: &str) -> Option<String> {
    match line.trim() {
        "." => None,
        "-" => Some(String::new()),
        "" => Some(current.to_string()),
        value => Some(value.strip_prefix('\\').unwrap_or(value).to_string()),
    }
}

// ─── Rendering ───────────────────────────────────────────────────────────────

pub(crate) fn render_gate(display_name: &str, auth: &Authenticator) -> String {
    let mut out = format!("{}\n", display_name);

    for (row, chunk) in auth.pool().presented().chunks(GRID_COLUMNS).enumerate() {
        let cells: Vec<String> = chunk
            .iter()
            .enumerate()
            .map(|(col, symbol)| format!("[{:>2}] {}", row * GRID_COLUMNS + col + 1, symbol))
            .collect();
        out.push_str(&format!("  {}\n", cells.join("  ")));
    }

    let picked = auth.attempt().len();
    let dots: String = "●".repeat(picked) + &"○".repeat(PATTERN_LEN.saturating_sub(picked));
    out.push_str(&format!("  {}\n", dots));
    if auth.failed() {
        out.push_str("  Wrong pattern, try again.\n");
    }
    out
}

pub(crate) fn render_table(rows: &[RecordView]) -> String {
    if rows.is_empty() {
        return "No records. Add one with `new`.\n".to_string();
    }

    let mut out = format!(
        "  {:<8} │ {:<16} │ {:<16} │ {:<16} │ {:<10} │ {}\n",
        "ID", "Service", "Username", "Secret", "Category", "URL"
    );
    out.push_str(&format!("{:-<96}\n", ""));
    for row in rows {
        out.push_str(&format!(
            "  {:<8} │ {:<16} │ {:<16} │ {:<16} │ {:<10} │ {}\n",
            row.id,
            row.service,
            row.username,
            row.secret,
            row.category,
            row.url
        ));
        if !row.note.is_empty() {
            out.push_str(&format!("           {}\n", row.note));
        }
    }
    out
}

// ─── Session loop ────────────────────────────────────────────────────────────

pub(crate) struct Terminal<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R, W> Terminal<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub(crate) fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
        }
    }

    /// Drive the session until `quit` or end of input.
    pub(crate) async fn run<S: RecordStore>(&mut self, vault: &mut Vault<S>) -> Result<(), DoryError> {
        loop {
            let keep_going = if vault.session().authenticated {
                self.dashboard_turn(vault).await?
            } else {
                self.gate_turn(vault).await?
            };
            if !keep_going {
                return Ok(());
            }
        }
    }

    async fn gate_turn<S: RecordStore>(&mut self, vault: &mut Vault<S>) -> Result<bool, DoryError> {
        write!(self.out, "{}", render_gate(vault.display_name(), vault.auth()))?;
        let Some(line) = self.prompt("pattern> ").await? else {
            return Ok(false);
        };

        match line.trim().to_lowercase().as_str() {
            "quit" | "exit" | "q" => return Ok(false),
            "help" | "?" => writeln!(self.out, "{}", GATE_HELP)?,
            "reset" => {
                vault.reset();
            }
            "enter" => match vault.confirm().await {
                AuthOutcome::Granted => {
                    writeln!(self.out, "Welcome, {}.", vault.display_name())?;
                    let rows = vault.records_view().await;
                    write!(self.out, "{}", render_table(&rows))?;
                }
                AuthOutcome::Mismatch => {}
                AuthOutcome::NotReady => {
                    writeln!(self.out, "Pick {} symbols first.", PATTERN_LEN)?;
                }
            },
            _ => {
                for pick in parse_picks(&line) {
                    let accepted = match &pick {
                        Pick::Position(p) => vault.select_position(*p),
                        Pick::Symbol(s) => vault.select_symbol(s),
                    };
                    if !accepted {
                        break;
                    }
                }
            }
        }
        Ok(true)
    }

    async fn dashboard_turn<S: RecordStore>(&mut self, vault: &mut Vault<S>) -> Result<bool, DoryError> {
        let marker = if vault.session().panic_mode { " [panic]" } else { "" };
        let Some(line) = self.prompt(&format!("{}{}> ", vault.display_name(), marker)).await? else {
            return Ok(false);
        };

        match parse_command(&line) {
            Command::List => {
                let rows = vault.records_view().await;
                write!(self.out, "{}", render_table(&rows))?;
            }
            Command::New => {
                vault.new_record()?;
                self.edit_and_save(vault).await?;
            }
            Command::Edit(label) => {
                let opened = match vault.resolve_id(&label).await {
                    Ok(id) => vault.edit_record(&id).await,
                    Err(e) => Err(e),
                };
                match opened {
                    Ok(()) => self.edit_and_save(vault).await?,
                    Err(e) => self.alert(&e)?,
                }
            }
            Command::Delete(label) => self.delete(vault, &label).await?,
            Command::Panic => {
                let on = vault.toggle_panic()?;
                writeln!(self.out, "Panic mode {}.", if on { "on" } else { "off" })?;
            }
            Command::Refresh => {
                if vault.refresh().await? == RefreshOutcome::Kept {
                    writeln!(self.out, "Alert: refresh failed; showing the last loaded records.")?;
                }
                let rows = vault.records_view().await;
                write!(self.out, "{}", render_table(&rows))?;
            }
            Command::Logout => {
                vault.logout().await;
                writeln!(self.out, "Locked.")?;
            }
            Command::Quit => return Ok(false),
            Command::Help => writeln!(self.out, "{}", DASHBOARD_HELP)?,
            Command::Unknown(other) => {
                writeln!(self.out, "Unknown command '{}'. {}", other, DASHBOARD_HELP)?;
            }
        }
        Ok(true)
    }

    /// Fill the open editor, then save. A validation error keeps what was
    /// typed and asks again; a failed write keeps the form and offers a retry.
    async fn edit_and_save<S: RecordStore>(&mut self, vault: &mut Vault<S>) -> Result<(), DoryError> {
        writeln!(self.out, "{}", EDITOR_HELP)?;

        'edit: loop {
            let mut fields = vault.form().fields.clone();
            if !self.fill(&mut fields).await? {
                vault.cancel_edit();
                writeln!(self.out, "Cancelled.")?;
                return Ok(());
            }
            vault.form_mut().fields = fields;

            loop {
                writeln!(self.out, "Saving…")?;
                match vault.save().await {
                    Ok(report) => {
                        if report.refresh == RefreshOutcome::Kept {
                            writeln!(self.out, "Alert: saved, but the list could not be refreshed.")?;
                        } else {
                            writeln!(self.out, "Saved.")?;
                        }
                        return Ok(());
                    }
                    Err(VaultError::Validation(e)) => {
                        self.alert(&e)?;
                        continue 'edit;
                    }
                    Err(e) => {
                        self.alert(&e)?;
                        if !self.confirm("Retry? [y/N] ").await? {
                            vault.cancel_edit();
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    async fn delete<S: RecordStore>(&mut self, vault: &mut Vault<S>, label: &str) -> Result<(), DoryError> {
        let requested = match vault.resolve_id(label).await {
            Ok(id) => vault.request_delete(&id).await,
            Err(e) => Err(e),
        };
        let confirmation = match requested {
            Ok(confirmation) => confirmation,
            Err(e) => return self.alert(&e),
        };

        let question = format!("Delete {} ({})? [y/N] ", confirmation.service(), confirmation.id());
        if !self.confirm(&question).await? {
            writeln!(self.out, "Kept.")?;
            return Ok(());
        }

        match vault.confirm_delete(confirmation).await {
            Ok(_) => writeln!(self.out, "Deleted.")?,
            Err(e) => self.alert(&e)?,
        }
        Ok(())
    }

    /// Returns false when the user cancelled or input ended.
    async fn fill(&mut self, fields: &mut RecordFields) -> io::Result<bool> {
        let Some(service) = self.field("Service", &fields.service, false).await? else {
            return Ok(false);
        };
        let Some(username) = self.field("Username", &fields.username, false).await? else {
            return Ok(false);
        };
        let Some(secret) = self.field("Secret", fields.secret(), true).await? else {
            return Ok(false);
        };
        let Some(url) = self.field("URL", &fields.url, false).await? else {
            return Ok(false);
        };
        let Some(note) = self.field("Note", &fields.note, false).await? else {
            return Ok(false);
        };
        let Some(category) = self.field("Category", &fields.category, false).await? else {
            return Ok(false);
        };

        fields.service = service;
        fields.username = username;
        fields.set_secret(secret);
        fields.url = url;
        fields.note = note;
        fields.category = category;
        Ok(true)
    }

    async fn field(&mut self, label: &str, current: &str, hidden: bool) -> io::Result<Option<String>> {
        let label = match (current.is_empty(), hidden) {
            (true, _) => format!("  {}: ", label),
            (false, true) => format!("  {} [unchanged]: ", label),
            (false, false) => format!("  {} [{}]: ", label, current),
        };
        let Some(line) = self.prompt(&label).await? else {
            return Ok(None);
        };
        Ok(parse_field(&line, current))
    }

    async fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.prompt(question).await?.unwrap_or_default();
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    async fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.out, "{}", label)?;
        self.out.flush()?;
        self.lines.next_line().await
    }

    fn alert(&mut self, error: &dyn std::fmt::Display) -> Result<(), DoryError> {
        writeln!(self.out, "Alert: {}", error)?;
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{HashedPattern, SymbolPool};
    use crate::store::mock::{Call, MockRecordStore};
    use crate::store::{CredentialRecord, Mutation, RecordId, WriteAck};
    use crate::sync::SyncController;
    use std::sync::Arc;
    use std::time::Duration;

    fn seq(tokens: &[&str]) -> Vec<Symbol> {
        tokens.iter().map(|t| Symbol::from(*t)).collect()
    }

    fn vault(store: MockRecordStore) -> Vault<MockRecordStore> {
        let pool = SymbolPool::new(seq(&["A", "B", "C", "D"])).unwrap();
        let verifier = HashedPattern::from_symbols(&seq(&["B", "D", "A", "C"])).unwrap();
        let auth = Authenticator::new(pool, Box::new(verifier));
        let sync = Arc::new(SyncController::new(store, Duration::ZERO));
        Vault::new(auth, sync, "Tester", "****")
    }

    async fn script(vault: &mut Vault<MockRecordStore>, input: &str) -> String {
        let mut out = Vec::new();
        {
            let mut terminal = Terminal::new(input.as_bytes(), &mut out);
            terminal.run(vault).await.unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_picks() {
        assert_eq!(
            parse_picks("2, 4 1  B"),
            vec![
                Pick::Position(1),
                Pick::Position(3),
                Pick::Position(0),
                Pick::Symbol(Symbol::from("B")),
            ]
        );
        assert_eq!(parse_picks("0"), vec![Pick::Symbol(Symbol::from("0"))]);
        assert!(parse_picks("   ").is_empty());
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("edit row-3"), Command::Edit("row-3".to_string()));
        assert_eq!(parse_command("DELETE 7"), Command::Delete("7".to_string()));
        assert_eq!(parse_command(""), Command::List);
        assert_eq!(parse_command("edit"), Command::Unknown("edit".to_string()));
        assert_eq!(parse_command("q"), Command::Quit);
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field("  Mail  ", "old"), Some("Mail".to_string()));
        assert_eq!(parse_field("", "old"), Some("old".to_string()));
        assert_eq!(parse_field("-", "old"), Some(String::new()));
        assert_eq!(parse_field(" . ", "old"), None);
        assert_eq!(parse_field("\\-", "old"), Some("-".to_string()));
        assert_eq!(parse_field("\\.", "old"), Some(".".to_string()));
    }

    #[test]
    fn test_render_gate_numbers_every_symbol() {
        let v = vault(MockRecordStore::fire_and_forget());
        let text = render_gate("Tester", v.auth());
        for n in 1..=4 {
            assert!(text.contains(&format!("[ {}]", n)));
        }
        assert!(text.contains("○○○○"));
        assert!(!text.contains("Wrong pattern"));
    }

    #[test]
    fn test_render_table_shows_masked_rows() {
        let record = MockRecordStore::seed("row-1", RecordFields::new("Mail", "val", "x").with_note("2fa"));
        let rows = vec![RecordView::of(&record, true, "****")];
        let text = render_table(&rows);
        assert!(text.contains("Mail"));
        assert!(text.contains("****"));
        assert!(!text.contains("val"));
        assert!(text.contains("2fa"));
        assert!(render_table(&[]).starts_with("No records"));
    }

    #[tokio::test]
    async fn test_wrong_pattern_shows_failure() {
        let mut v = vault(MockRecordStore::fire_and_forget());
        let out = script(&mut v, "B D C A\nenter\nquit\n").await;
        assert!(out.contains("Wrong pattern"));
        assert!(!v.session().authenticated);
    }

    #[tokio::test]
    async fn test_scripted_session_round_trip() {
        let store = MockRecordStore::new(WriteAck::Confirmed)
            .with_records(vec![MockRecordStore::seed("row-7", RecordFields::new("Bank", "me", "pin"))]);
        let mut v = vault(store);

        let input = "B D A C\nenter\n\
                     panic\nlist\npanic\n\
                     new\nMail\nval\nx\n\n\npersonal\n\
                     delete row-7\ny\n\
                     logout\nquit\n";
        let out = script(&mut v, input).await;

        assert!(out.contains("Welcome, Tester."));
        assert!(out.contains("Panic mode on."));
        assert!(out.contains("Saved."));
        assert!(out.contains("Deleted."));
        assert!(out.contains("Locked."));
        assert!(!v.session().authenticated);

        let calls = v.sync().store().calls();
        assert!(matches!(&calls[1], Call::Mutate(Mutation::Create(f)) if f.service == "Mail" && f.category == "personal"));
        assert_eq!(
            calls[3],
            Call::Mutate(Mutation::Delete {
                id: RecordId::from("row-7")
            })
        );
        let remaining = v.sync().store().records();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].fields.service, "Mail");
    }

    #[tokio::test]
    async fn test_declined_delete_dispatches_nothing() {
        let store = MockRecordStore::fire_and_forget()
            .with_records(vec![MockRecordStore::seed("row-7", RecordFields::new("Bank", "me", "pin"))]);
        let mut v = vault(store);

        let out = script(&mut v, "B D A C\nenter\ndelete row-7\nn\nquit\n").await;
        assert!(out.contains("Delete Bank (row-7)?"));
        assert!(out.contains("Kept."));
        assert_eq!(v.sync().store().calls(), vec![Call::List]);
    }

    #[tokio::test]
    async fn test_edit_keeps_blank_fields_and_cancel_writes_nothing() {
        let store = MockRecordStore::new(WriteAck::Confirmed)
            .with_records(vec![MockRecordStore::seed("row-7", RecordFields::new("Bank", "me", "pin"))]);
        let mut v = vault(store);

        let out = script(&mut v, "B D A C\nenter\nedit row-7\n\nyou\n\n.\nedit row-7\n\n\nnew-pin\n\n\n\nquit\n").await;
        assert!(out.contains("Cancelled."));
        assert!(out.contains("Secret [unchanged]"));

        let calls = v.sync().store().calls();
        assert_eq!(calls.len(), 3, "initial list, one update, refresh");
        match &calls[1] {
            Call::Mutate(Mutation::Update { id, fields }) => {
                assert_eq!(id, &RecordId::from("row-7"));
                assert_eq!(fields.username, "me");
                assert_eq!(fields.secret(), "new-pin");
            }
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_save_offers_retry() {
        let store = MockRecordStore::fire_and_forget();
        store.fail_writes(true);
        let mut v = vault(store);

        let out = script(&mut v, "B D A C\nenter\nnew\nMail\nval\nx\n\n\n\nn\nquit\n").await;
        assert!(out.contains("Alert: "));
        assert!(out.contains("Retry?"));
        assert_eq!(v.form().fields, RecordFields::default());
    }

    #[tokio::test]
    async fn test_missing_field_reprompts_with_typed_values() {
        let mut v = vault(MockRecordStore::new(WriteAck::Confirmed));

        // Username left blank: the editor asks again, keeping "Mail" and the secret.
        let input = "B D A C\nenter\nnew\n  Mail \n\nx\n\n\n\n\nval\n\n\n\n\nquit\n";
        let out = script(&mut v, input).await;

        assert!(out.contains("Alert: Required field is empty: username"));
        assert!(out.contains("Service [Mail]"));
        assert!(out.contains("Saved."));
        assert!(!out.contains("Cancelled."));

        let calls = v.sync().store().calls();
        assert_eq!(calls.len(), 3, "initial list, one create, refresh");
        match &calls[1] {
            Call::Mutate(Mutation::Create(fields)) => {
                assert_eq!(fields.service, "Mail");
                assert_eq!(fields.username, "val");
                assert_eq!(fields.secret(), "x");
            }
            other => panic!("expected create, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_typed_id_deletes_numeric_row() {
        let store = MockRecordStore::new(WriteAck::Confirmed).with_records(vec![CredentialRecord {
            id: RecordId::from(7),
            fields: RecordFields::new("Bank", "me", "pin"),
        }]);
        let mut v = vault(store);

        let out = script(&mut v, "B D A C\nenter\ndelete 7\ny\ndelete 9\nquit\n").await;
        assert!(out.contains("Deleted."));
        assert!(out.contains("Alert: No loaded record with id 9"));
        assert_eq!(
            v.sync().store().calls()[1],
            Call::Mutate(Mutation::Delete {
                id: RecordId::from(7)
            })
        );
    }

    #[tokio::test]
    async fn test_end_of_input_ends_session() {
        let mut v = vault(MockRecordStore::fire_and_forget());
        let out = script(&mut v, "1 2").await;
        assert!(out.contains("pattern> "));
    }
}
