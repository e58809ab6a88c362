use crate::Response;
use crate::runner::Executor;

pub const DIAGNOSTIC_COMMANDS: [&str; 4] = ["uname -a", "lsblk -f", "df -h", "free -h"];

/// Runs every diagnostic command in order and concatenates the labelled
/// results. A failing command is reported inline and never aborts the bundle.
pub fn run_diagnostics<E: Executor + ?Sized>(executor: &E) -> Response {
    let mut sections = Vec::with_capacity(DIAGNOSTIC_COMMANDS.len() * 3);

    for command in DIAGNOSTIC_COMMANDS {
        let response = executor.run(command);
        sections.push(format!("=== {command} ==="));
        sections.push(response.result.unwrap_or_else(|| "Error".to_string()));
        sections.push(String::new());
    }

    Response::ok(sections.join("\n"))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Records every command and answers from a closure.
    struct FakeExecutor<F> {
        seen: RefCell<Vec<String>>,
        answer: F,
    }

    impl<F: Fn(&str) -> Response> Executor for FakeExecutor<F> {
        fn run(&self, command_line: &str) -> Response {
            self.seen.borrow_mut().push(command_line.to_string());
            (self.answer)(command_line)
        }
    }

    #[test]
    fn runs_commands_in_fixed_order() {
        let executor = FakeExecutor {
            seen: RefCell::new(Vec::new()),
            answer: |cmd: &str| Response::ok(format!("out of {cmd}")),
        };

        let response = run_diagnostics(&executor);

        assert!(response.success);
        assert_eq!(*executor.seen.borrow(), DIAGNOSTIC_COMMANDS.to_vec());
        assert_eq!(
            response.result.as_deref(),
            Some(
                "=== uname -a ===\nout of uname -a\n\n\
                 === lsblk -f ===\nout of lsblk -f\n\n\
                 === df -h ===\nout of df -h\n\n\
                 === free -h ===\nout of free -h\n"
            )
        );
    }

    #[test]
    fn failures_are_folded_into_the_report() {
        let executor = FakeExecutor {
            seen: RefCell::new(Vec::new()),
            answer: |cmd: &str| match cmd {
                "lsblk -f" => Response::failure("Error ejecutando: missing"),
                "df -h" => Response {
                    success: false,
                    result: Some("[exit_code]: 1".to_string()),
                    error: None,
                },
                _ => Response::ok("fine"),
            },
        };

        let response = run_diagnostics(&executor);

        assert!(response.success);
        let text = response.result.expect("result");
        assert!(text.contains("=== lsblk -f ===\nError\n"));
        assert!(text.contains("=== df -h ===\n[exit_code]: 1\n"));
        assert_eq!(text.matches("=== ").count(), 4);
    }
}
