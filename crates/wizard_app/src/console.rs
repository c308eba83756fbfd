//! Line-oriented stand-in for a windowed renderer: prints pages and changes
//! to a writer and turns typed commands into intents.

use std::io::Write;

use wizard_core::{
    ButtonState, Item, ItemId, Msg, NavError, Step, Thumbnail, WizardObserver, WizardView,
};
use wizard_logging::wizard_trace;

pub const HELP: &str = "commands: n(ext), b(ack), s(elect) <id>, c(hoose) <id>, q(uit)";

pub fn parse_command(line: &str) -> Result<Option<Msg>, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let mut item_id = || -> Result<ItemId, String> {
        words
            .next()
            .ok_or_else(|| format!("'{command}' needs a card id"))?
            .parse()
            .map_err(|_| format!("'{command}' needs a numeric card id"))
    };
    let msg = match command {
        "n" | "next" => Msg::NextClicked,
        "b" | "back" => Msg::BackClicked,
        "s" | "select" => Msg::CardSelected {
            item_id: item_id()?,
        },
        "c" | "choose" => Msg::CardChosen {
            item_id: item_id()?,
        },
        "q" | "quit" => Msg::CloseRequested,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(msg))
}

pub struct ConsoleObserver<W: Write> {
    out: W,
    page_changed: bool,
    shown_error: Option<NavError>,
}

impl<W: Write> ConsoleObserver<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            page_changed: true,
            shown_error: None,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Prints the whole page when the step changed since the last call, and
    /// any rejection that has not been shown yet.
    pub fn render(&mut self, view: &WizardView) {
        if std::mem::take(&mut self.page_changed) {
            self.print_page(view);
        }
        if view.last_error != self.shown_error {
            self.shown_error = view.last_error.clone();
            if let Some(err) = &view.last_error {
                self.line(format_args!("! {err}"));
            }
        }
    }

    fn print_page(&mut self, view: &WizardView) {
        self.line(format_args!("== {} ==", page_title(view.step)));
        match view.step {
            Step::Welcome => self.line(format_args!("Press next to start processing.")),
            Step::Processing => self.line(format_args!("Processing, please wait...")),
            Step::Results => {
                for card in &view.cards {
                    let marker = if card.selected { '*' } else { ' ' };
                    self.line(format_args!(
                        "{marker} [{}] {}  ({})",
                        card.item.id,
                        card.item.name,
                        describe_thumbnail(&card.thumbnail)
                    ));
                }
            }
            Step::Final => {
                for text in view.final_text.lines() {
                    self.line(format_args!("{text}"));
                }
            }
        }
        self.line(format_args!(
            "[back: {}] [next: {}]",
            describe_button(view.back),
            describe_button(view.next)
        ));
    }

    pub fn message(&mut self, text: &str) {
        self.line(format_args!("{text}"));
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        let _ = writeln!(self.out, "{args}");
        let _ = self.out.flush();
    }
}

impl<W: Write> WizardObserver for ConsoleObserver<W> {
    fn on_step_changed(&mut self, _step: Step) {
        self.page_changed = true;
    }

    fn on_selection_changed(&mut self, selection: Option<&Item>) {
        match selection {
            Some(item) => self.line(format_args!("selected: {}", item.name)),
            None => self.line(format_args!("selection cleared")),
        }
    }

    fn on_transition_frame(&mut self, progress: f32, from_offset: f32, to_offset: f32) {
        wizard_trace!(
            "transition {:.2}: from {:.1} to {:.1}",
            progress,
            from_offset,
            to_offset
        );
    }

    fn on_download_state_changed(&mut self, item_id: ItemId, thumbnail: &Thumbnail) {
        self.line(format_args!(
            "thumbnail {item_id}: {}",
            describe_thumbnail(thumbnail)
        ));
    }
}

fn page_title(step: Step) -> &'static str {
    match step {
        Step::Welcome => "Welcome",
        Step::Processing => "Processing",
        Step::Results => "Results",
        Step::Final => "Done",
    }
}

fn describe_button(state: ButtonState) -> &'static str {
    match state {
        ButtonState::Hidden => "-",
        ButtonState::Disabled => "off",
        ButtonState::Enabled => "on",
    }
}

fn describe_thumbnail(thumbnail: &Thumbnail) -> String {
    match thumbnail {
        Thumbnail::Idle => "no thumbnail".to_string(),
        Thumbnail::Loading => "loading".to_string(),
        Thumbnail::Loaded(bytes) => format!("loaded, {} bytes", bytes.len()),
        Thumbnail::Failed(reason) => format!("failed: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wizard_core::{update, AppState};

    #[test]
    fn commands_parse_into_intents() {
        assert_eq!(parse_command("n"), Ok(Some(Msg::NextClicked)));
        assert_eq!(parse_command("  back "), Ok(Some(Msg::BackClicked)));
        assert_eq!(
            parse_command("s 3"),
            Ok(Some(Msg::CardSelected { item_id: 3 }))
        );
        assert_eq!(
            parse_command("choose 2"),
            Ok(Some(Msg::CardChosen { item_id: 2 }))
        );
        assert_eq!(parse_command("q"), Ok(Some(Msg::CloseRequested)));
        assert_eq!(parse_command(""), Ok(None));
    }

    #[test]
    fn malformed_commands_are_reported() {
        assert!(parse_command("s").is_err());
        assert!(parse_command("s two").is_err());
        assert!(parse_command("jump").is_err());
    }

    #[test]
    fn final_page_prints_choice() {
        let (state, _) = update(AppState::new(), Msg::NextClicked);
        let (state, _) = update(
            state,
            Msg::JobFinished {
                items: vec![Item::new(1, "Project Alpha")],
            },
        );
        let (state, _) = update(state, Msg::CardChosen { item_id: 1 });

        let mut console = ConsoleObserver::new(Vec::new());
        console.render(&state.view());
        let printed = String::from_utf8(console.into_inner()).unwrap();

        assert_eq!(
            printed,
            "== Done ==\nYou chose:\nProject Alpha\n[back: on] [next: -]\n"
        );
    }

    #[test]
    fn unchanged_page_only_reports_errors() {
        let (state, _) = update(AppState::new(), Msg::BackClicked);
        let mut console = ConsoleObserver::new(Vec::new());
        console.render(&AppState::new().view());
        console.render(&state.view());
        let printed = String::from_utf8(console.into_inner()).unwrap();

        assert!(printed.starts_with("== Welcome =="));
        assert!(printed
            .ends_with("! invalid operation: back is not available on the Welcome page\n"));
    }
}
