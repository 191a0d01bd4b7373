// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Line-oriented console front-end.

use anyhow::Result;
use std::future::Future;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::bluetooth::SerialLink;
use crate::controller::Controller;
use crate::params::Field;
use crate::state::AppState;
use crate::storage::{PreferenceStore, MISSING_VALUE};

const HELP: &str = "\
Commands:
  setup                          connect to the FES device
  send [freq rise current decay] send parameters (no values: resend last values)
  values                         show the last values sent
  status                         show connection status
  disable                        disable all device controls
  help                           show this help
  quit                           exit";

/// Actions that can be entered at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleAction {
    Setup,
    /// Raw field text; `None` means reuse the stored values.
    Send(Option<[String; 4]>),
    Values,
    Status,
    Disable,
    Help,
    Quit,
}

impl ConsoleAction {
    /// Parse one input line.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let action = match command.to_lowercase().as_str() {
            "setup" => ConsoleAction::Setup,
            "send" => {
                if args.is_empty() {
                    ConsoleAction::Send(None)
                } else if args.len() > 4 {
                    return Err("send takes at most four values".to_string());
                } else {
                    // Missing trailing values are blank fields.
                    let fields = std::array::from_fn(|i| {
                        args.get(i).map(|s| s.to_string()).unwrap_or_default()
                    });
                    ConsoleAction::Send(Some(fields))
                }
            }
            "values" => ConsoleAction::Values,
            "status" => ConsoleAction::Status,
            "disable" => ConsoleAction::Disable,
            "help" | "?" => ConsoleAction::Help,
            "quit" | "exit" => ConsoleAction::Quit,
            other => return Err(format!("unknown command '{}', try 'help'", other)),
        };
        Ok(Some(action))
    }
}

fn format_value(value: i32) -> String {
    if value == MISSING_VALUE {
        "-".to_string()
    } else {
        value.to_string()
    }
}

fn print_values(values: [i32; 4]) {
    for (field, value) in Field::ALL.into_iter().zip(values) {
        println!("  {:<18} {}", field.label(), format_value(value));
    }
}

fn print_feedback(state: &AppState) {
    for error in state.get_errors() {
        println!("! {}", error);
    }
    if let Some(notice) = state.take_notice() {
        println!("{}", notice);
    }
}

/// Run the prompt on stdin until `quit`, end of input, or Ctrl-C.
pub async fn run_console<L, P>(controller: &mut Controller<L, P>) -> Result<()>
where
    L: SerialLink,
    P: PreferenceStore,
{
    println!("FES Controller. Type 'help' for commands.");
    println!("Last values:");
    print_values(controller.last_values());

    run_prompt(controller, BufReader::new(tokio::io::stdin()), tokio::signal::ctrl_c()).await
}

/// Read commands from `input` until `quit`, end of input, or `shutdown`.
///
/// `shutdown` is polled while waiting for input and while an action runs, so
/// a hung connect or write does not swallow it.
pub async fn run_prompt<L, P, R, F>(
    controller: &mut Controller<L, P>,
    input: R,
    shutdown: F,
) -> Result<()>
where
    L: SerialLink,
    P: PreferenceStore,
    R: AsyncBufRead + Unpin,
    F: Future<Output = io::Result<()>>,
{
    let mut lines = input.lines();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            result = &mut shutdown => {
                log_shutdown(result);
                break;
            }
        };
        let Some(line) = line else {
            info!("End of input");
            break;
        };

        let action = match ConsoleAction::parse(&line) {
            Ok(Some(ConsoleAction::Quit)) => {
                info!("Quit requested");
                break;
            }
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        tokio::select! {
            _ = handle_action(controller, action) => {}
            result = &mut shutdown => {
                warn!("Interrupted while a command was running");
                log_shutdown(result);
                break;
            }
        }
    }

    Ok(())
}

fn log_shutdown(result: io::Result<()>) {
    match result {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
    }
}

async fn handle_action<L, P>(controller: &mut Controller<L, P>, action: ConsoleAction)
where
    L: SerialLink,
    P: PreferenceStore,
{
    let state = controller.state().clone();
    let controls = state.get_controls();

    match action {
        ConsoleAction::Setup => {
            if !controls.setup {
                println!("Setup is disabled.");
                return;
            }
            if controller.setup_device().await.is_ok() {
                println!("Connected. Parameter entry enabled.");
            }
            print_feedback(&state);
        }
        ConsoleAction::Send(fields) => {
            if !controls.send {
                println!("Sending is disabled. Run 'setup' first.");
                return;
            }
            let fields =
                fields.unwrap_or_else(|| controller.last_values().map(|v| v.to_string()));
            let inputs = [
                fields[0].as_str(),
                fields[1].as_str(),
                fields[2].as_str(),
                fields[3].as_str(),
            ];
            if let Ok(message) = controller.submit(inputs).await {
                println!("Message: {}", message);
            }
            print_feedback(&state);
        }
        ConsoleAction::Values => print_values(controller.last_values()),
        ConsoleAction::Status => {
            println!("Status:  {}", state.get_status().as_str());
            println!("Session: {}", controller.session().state().as_str());
            if let Some(device) = state.get_device_name() {
                println!("Device:  {}", device);
            }
            println!(
                "Controls: inputs={} send={} setup={}",
                controls.inputs, controls.send, controls.setup
            );
        }
        ConsoleAction::Disable => {
            controller.disable_all();
            println!("All device controls disabled.");
        }
        ConsoleAction::Help => println!("{}", HELP),
        ConsoleAction::Quit => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bluetooth::mock::{MockLink, Step};
    use crate::bluetooth::{DeviceSession, SessionOptions, SessionState};
    use crate::state::ConnectionStatus;
    use crate::storage::JsonPreferences;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};
    use tokio::sync::oneshot;

    fn controller(link: &MockLink) -> (Controller<MockLink, JsonPreferences>, TempDir) {
        let dir = tempdir().unwrap();
        let prefs = JsonPreferences::new(dir.path()).unwrap();
        let session = DeviceSession::new(link.clone(), SessionOptions::default());
        (Controller::new(session, prefs, AppState::new()), dir)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ConsoleAction::parse("  "), Ok(None));
        assert_eq!(ConsoleAction::parse("SETUP"), Ok(Some(ConsoleAction::Setup)));
        assert_eq!(ConsoleAction::parse("exit"), Ok(Some(ConsoleAction::Quit)));
        assert!(ConsoleAction::parse("reboot").is_err());
    }

    #[test]
    fn test_parse_send() {
        assert_eq!(ConsoleAction::parse("send"), Ok(Some(ConsoleAction::Send(None))));

        let Ok(Some(ConsoleAction::Send(Some(fields)))) = ConsoleAction::parse("send 50 100 20")
        else {
            panic!("expected send with fields");
        };
        assert_eq!(fields, ["50", "100", "20", ""].map(String::from));

        assert!(ConsoleAction::parse("send 1 2 3 4 5").is_err());
    }

    #[test]
    fn test_format_missing_value() {
        assert_eq!(format_value(MISSING_VALUE), "-");
        assert_eq!(format_value(40), "40");
    }

    #[tokio::test]
    async fn test_prompt_runs_commands_until_quit() {
        let link = MockLink::with_devices(&["HC-06"]);
        let (mut ctl, _dir) = controller(&link);
        let input: &[u8] = b"setup\nsend 50 100 20 500\nquit\nsend 1 4 1 1\n";

        let shutdown = std::future::pending::<io::Result<()>>();
        run_prompt(&mut ctl, input, shutdown).await.unwrap();

        assert_eq!(ctl.state().get_status(), ConnectionStatus::Connected);
        assert_eq!(link.written(), b"0b1F0D6P".to_vec());
    }

    #[tokio::test]
    async fn test_shutdown_while_waiting_for_input() {
        let link = MockLink::with_devices(&["HC-06"]);
        let (mut ctl, _dir) = controller(&link);
        // The writer half stays open, so no line ever arrives.
        let (_writer, reader) = tokio::io::duplex(64);

        let shutdown = async { Ok::<(), io::Error>(()) };
        let prompt = run_prompt(&mut ctl, BufReader::new(reader), shutdown);
        tokio::time::timeout(Duration::from_secs(5), prompt)
            .await
            .expect("prompt ignored shutdown")
            .unwrap();
        assert_eq!(link.discoveries(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_hung_setup() {
        let link = MockLink::with_devices(&["HC-06"]);
        link.stall(Step::Connect);
        let (mut ctl, _dir) = controller(&link);
        let (signal_tx, signal_rx) = oneshot::channel::<()>();
        let input: &[u8] = b"setup\n";

        let watcher = link.clone();
        tokio::spawn(async move {
            // Signal only once the connect is under way.
            while watcher.sockets_for().is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            let _ = signal_tx.send(());
        });

        let shutdown = async move {
            let _ = signal_rx.await;
            Ok::<(), io::Error>(())
        };
        tokio::time::timeout(Duration::from_secs(5), run_prompt(&mut ctl, input, shutdown))
            .await
            .expect("shutdown lost while setup was running")
            .unwrap();
        assert_eq!(ctl.session().state(), SessionState::Connecting);

        ctl.shutdown().await;
        assert_eq!(ctl.session().state(), SessionState::Idle);
        assert_eq!(ctl.state().get_status(), ConnectionStatus::Disconnected);
    }
}
