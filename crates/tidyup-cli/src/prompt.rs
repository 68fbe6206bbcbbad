use colored::*;
use std::io::{self, BufRead, Write};
use tidyup_core::{Action, ActionKind, Category, Choice, Chooser, Error};

/// Asks on a terminal. Generic over the streams so tests can script it.
pub struct TerminalChooser<R, W> {
    input: R,
    output: W,
}

impl TerminalChooser<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalChooser<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, prompt: &str) -> Result<String, Error> {
        write!(self.output, "{}", prompt).map_err(prompt_err)?;
        self.output.flush().map_err(prompt_err)?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(prompt_err)?;
        if read == 0 {
            return Err(Error::Prompt("input closed".to_string()));
        }
        Ok(line.trim().to_string())
    }

    fn print_action(&mut self, action: &Action) -> Result<(), Error> {
        let out = &mut self.output;
        writeln!(out, "File: {}", action.path.display().to_string().bold()).map_err(prompt_err)?;
        writeln!(out, "Suggested action: {}", action.kind.name().cyan()).map_err(prompt_err)?;
        match &action.kind {
            ActionKind::Move { new_path } | ActionKind::Rename { new_path } => {
                writeln!(out, "New path: {}", new_path.display()).map_err(prompt_err)?;
            }
            ActionKind::Chmod { new_mode } => {
                writeln!(out, "New mode: {:o}", new_mode).map_err(prompt_err)?;
            }
            ActionKind::Delete | ActionKind::Keep => {}
        }
        writeln!(out, "Reason: {}", action.reason.dimmed()).map_err(prompt_err)?;
        writeln!(out, "{}", "-".repeat(50)).map_err(prompt_err)
    }

    fn print_group(&mut self, category: Category, actions: &[Action]) -> Result<(), Error> {
        writeln!(
            self.output,
            "\n=== {} ({} files) ===",
            category.title().bold(),
            actions.len()
        )
        .map_err(prompt_err)?;
        for action in actions {
            self.print_action(action)?;
        }
        Ok(())
    }

    /// Re-ask until the answer is one of `offered`.
    fn ask_choice(&mut self, lead: &str, offered: &[Choice]) -> Result<Choice, Error> {
        let options: Vec<String> = offered.iter().map(Choice::to_string).collect();
        let prompt = format!("{} ({}): ", lead, options.join(", "));
        loop {
            let answer = self.ask(&prompt)?;
            match Choice::from_key(&answer) {
                Some(choice) if offered.contains(&choice) => return Ok(choice),
                _ => writeln!(self.output, "Invalid choice. Please try again.")
                    .map_err(prompt_err)?,
            }
        }
    }
}

impl<R: BufRead, W: Write> Chooser for TerminalChooser<R, W> {
    fn choose_for_file(
        &mut self,
        _category: Category,
        action: &Action,
        offered: &[Choice],
    ) -> Result<Choice, Error> {
        writeln!(self.output).map_err(prompt_err)?;
        self.print_action(action)?;
        self.ask_choice("Choose action for this file", offered)
    }

    fn choose_for_group(
        &mut self,
        category: Category,
        actions: &[Action],
        offered: &[Choice],
    ) -> Result<Choice, Error> {
        self.print_group(category, actions)?;
        self.ask_choice("Choose action for all files in this group", offered)
    }

    fn select_groups(&mut self, available: &[(Category, usize)]) -> Result<Vec<Category>, Error> {
        if available.is_empty() {
            return Ok(Vec::new());
        }

        writeln!(self.output, "\nAvailable groups:").map_err(prompt_err)?;
        for (i, (category, count)) in available.iter().enumerate() {
            writeln!(self.output, "{}. {} ({} files)", i + 1, category.title(), count)
                .map_err(prompt_err)?;
        }

        let mut selected: Vec<Category> = Vec::new();
        loop {
            let answer = self.ask(
                "\nEnter group numbers to process (e.g., '1 2 3', or 'all' for all, or 'done' to finish): ",
            )?;
            match answer.to_lowercase().as_str() {
                "done" => break,
                "all" => {
                    for (category, _) in available {
                        if !selected.contains(category) {
                            selected.push(*category);
                        }
                    }
                    break;
                }
                other => {
                    for token in other.split_whitespace() {
                        match token.parse::<usize>() {
                            Ok(n) if (1..=available.len()).contains(&n) => {
                                let category = available[n - 1].0;
                                if !selected.contains(&category) {
                                    selected.push(category);
                                }
                            }
                            Ok(n) => writeln!(self.output, "Invalid group number: {}", n)
                                .map_err(prompt_err)?,
                            Err(_) => writeln!(
                                self.output,
                                "Invalid input. Enter numbers, 'all', or 'done'."
                            )
                            .map_err(prompt_err)?,
                        }
                    }
                }
            }
        }
        Ok(selected)
    }
}

fn prompt_err(e: io::Error) -> Error {
    Error::Prompt(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn chooser(script: &str) -> TerminalChooser<Cursor<Vec<u8>>, Vec<u8>> {
        colored::control::set_override(false);
        TerminalChooser::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    fn rename() -> Action {
        Action::new(
            "y2/doc space.txt",
            ActionKind::Rename {
                new_path: PathBuf::from("y2/doc_space.txt"),
            },
            "Problematic characters in name",
        )
    }

    #[test]
    fn test_reasks_until_offered_choice() {
        let mut chooser = chooser("d\nx\nr\n");
        let action = rename();
        let offered = Choice::offered_for(std::slice::from_ref(&action));

        let choice = chooser
            .choose_for_file(Category::BadChars, &action, &offered)
            .unwrap();
        assert_eq!(choice, Choice::Rename);

        let transcript = String::from_utf8(chooser.output).unwrap();
        assert!(transcript.contains("New path: y2/doc_space.txt"));
        assert_eq!(transcript.matches("Invalid choice").count(), 2);
    }

    #[test]
    fn test_closed_input_is_prompt_error() {
        let mut chooser = chooser("");
        let action = rename();
        let result = chooser.choose_for_group(Category::BadChars, &[action], &[Choice::Skip]);
        assert!(matches!(result, Err(Error::Prompt(_))));
    }

    #[test]
    fn test_select_groups_by_number_then_done() {
        let mut chooser = chooser("3 1 9\ndone\n");
        let available = vec![
            (Category::Empty, 2),
            (Category::Temporary, 3),
            (Category::MoveToX, 5),
        ];
        let selected = chooser.select_groups(&available).unwrap();
        assert_eq!(selected, vec![Category::MoveToX, Category::Empty]);

        let transcript = String::from_utf8(chooser.output).unwrap();
        assert!(transcript.contains("2. Temporary (3 files)"));
        assert!(transcript.contains("Invalid group number: 9"));
    }

    #[test]
    fn test_select_all() {
        let mut chooser = chooser("all\n");
        let available = vec![(Category::Empty, 1), (Category::Duplicates, 2)];
        assert_eq!(
            chooser.select_groups(&available).unwrap(),
            vec![Category::Empty, Category::Duplicates]
        );
    }
}
