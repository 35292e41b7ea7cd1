//! Terminal-independent key events

/// A key press the console reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    /// Ctrl-C always quits
    Interrupt,
}

/// What the foreground loop should do after a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleAction {
    Continue,
    Quit,
}

/// Key summary shown by the `help` action
pub const HELP_TEXT: &str = "\
Keys
  i / k, Up / Down     select action
  m / M, Right / Left  next / previous mode
  e / E                next / previous environment
  l, Enter             execute selected action
  o                    open detail view of the selected record
  j, Esc               back / hide results
  space                expand or collapse inline output
  PageUp / PageDown    scroll results
  c / C                cancel selected / all in environment
  t / T                test connectivity (current / all)
  r                    reset navigation
  /                    command input
  q                    quit

Commands
  prefix <env> <value...>   override connection prefix
  reset <env>               restore default prefix
  run <command>             run a registry command here
  cancel [command]          cancel a running command
  cancel-all [env]          cancel everything in an environment
  test [env|all]            connectivity check
  mode <MODE>               jump to mode
  env <name>                jump to environment
  commands                  list registry commands
  clear                     hide results";
