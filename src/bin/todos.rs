//! A terminal front-end for a to-do API.
//!
//! Set `TODO_API_URL` to the base URL of the API (and optionally `TODO_ADD_DATE=selected`),
//! and `RUST_LOG` to see more details about what happens.

use std::io::{stdin, BufRead};

use chrono::NaiveDate;

use todo_fridge::Client;
use todo_fridge::TodoView;
use todo_fridge::config::Settings;
use todo_fridge::feedback::{feedback_channel, FeedbackReceiver};
use todo_fridge::utils::{parse_date, print_todo_list, prompt, today};

const HELP: &str = "\
Commands:
  list                      show the to-dos of the selected date
  date <YYYY-MM-DD|today>   select another date
  title <text>              type the title of a new to-do
  add [text]                add a to-do (with the typed title, or <text>)
  toggle <n>                mark to-do #n as done / not done
  delete <n>                delete to-do #n
  help                      show this help
  quit                      exit";

/// A command typed by the user. Rows are 0-based indices into the displayed list
#[derive(Debug, PartialEq)]
enum Command {
    Nothing,
    Help,
    Quit,
    List,
    Date(NaiveDate),
    Title(String),
    /// Add a to-do, after replacing the draft title in case some text is given
    Add(Option<String>),
    Toggle(usize),
    Delete(usize),
}

impl Command {
    /// Whether the list should be displayed again after this command
    fn shows_list(&self) -> bool {
        match self {
            Command::Nothing | Command::Help | Command::Quit | Command::Title(_) => false,
            _ => true,
        }
    }
}

/// Parse a line typed by the user, while `n_rows` to-dos are displayed
fn parse_command(line: &str, today: NaiveDate, n_rows: usize) -> Result<Command, String> {
    let (command, argument) = match line.trim().split_once(' ') {
        Some((command, argument)) => (command, argument.trim()),
        None => (line.trim(), ""),
    };

    match command {
        "" => Ok(Command::Nothing),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        "help" | "h" | "?" => Ok(Command::Help),
        "list" | "ls" | "l" => Ok(Command::List),
        "date" if argument == "today" => Ok(Command::Date(today)),
        "date" => parse_date(argument).map(Command::Date).map_err(|err| err.to_string()),
        "title" => Ok(Command::Title(argument.to_string())),
        "add" if argument.is_empty() => Ok(Command::Add(None)),
        "add" => Ok(Command::Add(Some(argument.to_string()))),
        "toggle" => parse_row(argument, n_rows).map(Command::Toggle),
        "delete" => parse_row(argument, n_rows).map(Command::Delete),
        other => Err(format!("Unknown command {:?}. Type 'help' to list the available commands.", other)),
    }
}

/// Turn a 1-based row number into an index
fn parse_row(argument: &str, n_rows: usize) -> Result<usize, String> {
    match argument.parse::<usize>() {
        Ok(row) if row >= 1 && row <= n_rows => Ok(row - 1),
        _ => Err(format!("Expected a row number between 1 and {}", n_rows)),
    }
}


#[tokio::main]
async fn main() {
    env_logger::init();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(err) => {
            eprintln!("Invalid configuration: {}", err);
            std::process::exit(1);
        },
    };
    let client = match Client::from_settings(&settings) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("Unable to create a client: {}", err);
            std::process::exit(1);
        },
    };

    println!("Using the to-do API at {}", settings.api_url);
    println!("Type 'help' to list the available commands.");

    let (sender, mut receiver) = feedback_channel();
    let view = TodoView::new(client)
        .with_add_date_policy(settings.add_date_policy)
        .with_feedback(sender);

    view.mount().await;
    report_errors(&mut receiver);
    print_todo_list(view.selected_date(), &view.todos());

    let stdin = stdin();
    prompt("> ");
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(err) => {
                log::error!("Unable to read from stdin: {}", err);
                break;
            },
        };

        let todos = view.todos();
        let command = match parse_command(&line, today(), todos.len()) {
            Ok(c) => c,
            Err(err) => {
                println!("{}", err);
                prompt("> ");
                continue;
            },
        };

        match &command {
            Command::Nothing => {},
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            Command::List => { view.refresh().await; },
            Command::Date(date) => { view.select_date(*date).await; },
            Command::Title(title) => view.set_draft_title(title),
            Command::Add(title) => {
                if let Some(title) = title {
                    view.set_draft_title(title);
                }
                view.submit_draft().await;
            },
            Command::Toggle(index) => {
                let todo = &todos[*index];
                view.toggle_completed(todo.id(), todo.completed()).await;
            },
            Command::Delete(index) => {
                view.delete_todo(todos[*index].id()).await;
            },
        }

        if command.shows_list() {
            report_errors(&mut receiver);
            print_todo_list(view.selected_date(), &view.todos());
        }
        if view.draft_title().is_empty() == false {
            println!("(draft title: {:?})", view.draft_title());
        }
        prompt("> ");
    }
}

/// Tell the user about the last failure, if the latest operation failed
fn report_errors(receiver: &mut FeedbackReceiver) {
    let event = receiver.borrow_and_update().clone();
    if event.is_error() {
        println!("!! {}", event);
    }
}
