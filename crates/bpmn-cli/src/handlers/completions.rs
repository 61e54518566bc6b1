use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::Cli;

pub fn handle(shell: Shell) {
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "bpmn-modeler", &mut std::io::stdout());
}
