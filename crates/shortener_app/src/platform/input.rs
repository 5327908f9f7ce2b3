use shortener_core::{Command, FieldError, FieldId, Operation, OptionName, OptionValue};

/// What a line of terminal input asks for.
#[derive(Debug, Clone)]
pub enum InputLine {
    Command(Command),
    Help,
    Quit,
}

/// Maps a terminal line onto a field command. Plain text commits the field
/// value; `:`-prefixed words name an operation.
pub fn parse_line(field: FieldId, line: &str) -> Result<InputLine, FieldError> {
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(InputLine::Command(Command::ValueChanged {
            field,
            value: line.trim().to_string(),
        }));
    };

    let (word, args) = match rest.trim().split_once(char::is_whitespace) {
        Some((word, args)) => (word, args.trim()),
        None => (rest.trim(), ""),
    };
    match word {
        "help" => return Ok(InputLine::Help),
        "quit" | "q" => return Ok(InputLine::Quit),
        _ => {}
    }

    let command = match word.parse::<Operation>()? {
        Operation::Attach => Command::Attach {
            field,
            overrides: if args.is_empty() {
                Vec::new()
            } else {
                vec![OptionValue::endpoint(args)]
            },
        },
        Operation::ValueChanged => Command::ValueChanged {
            field,
            value: args.to_string(),
        },
        Operation::Enable => Command::Enable(field),
        Operation::Disable => Command::Disable(field),
        Operation::Destroy => Command::Destroy(field),
        Operation::Option => parse_option(field, args)?,
    };
    Ok(InputLine::Command(command))
}

fn parse_option(field: FieldId, args: &str) -> Result<Command, FieldError> {
    if args.is_empty() {
        return Ok(Command::GetOption { field, name: None });
    }
    let (name, value) = match args.split_once(char::is_whitespace) {
        Some((name, value)) => (name.parse::<OptionName>()?, Some(value)),
        None => (args.parse::<OptionName>()?, None),
    };
    match value {
        None => Ok(Command::GetOption {
            field,
            name: Some(name),
        }),
        Some(raw) => Ok(Command::SetOptions {
            field,
            values: vec![OptionValue::parse(name, raw)?],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_line_commits_trimmed_value() {
        let parsed = parse_line(1, "  www.mobileroadie.com ").unwrap();
        assert!(matches!(
            parsed,
            InputLine::Command(Command::ValueChanged { field: 1, ref value })
                if value == "www.mobileroadie.com"
        ));
    }

    #[test]
    fn lifecycle_words_map_to_commands() {
        assert!(matches!(
            parse_line(1, ":disable").unwrap(),
            InputLine::Command(Command::Disable(1))
        ));
        assert!(matches!(
            parse_line(1, ":enable").unwrap(),
            InputLine::Command(Command::Enable(1))
        ));
        assert!(matches!(
            parse_line(1, ":destroy").unwrap(),
            InputLine::Command(Command::Destroy(1))
        ));
        assert!(matches!(parse_line(1, ":quit").unwrap(), InputLine::Quit));
        assert!(matches!(parse_line(1, ":help").unwrap(), InputLine::Help));
    }

    #[test]
    fn attach_takes_optional_endpoint() {
        let InputLine::Command(Command::Attach { overrides, .. }) =
            parse_line(1, ":attach /bitly/endpoint/").unwrap()
        else {
            panic!("expected attach");
        };
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].to_string(), "/bitly/endpoint/");
    }

    #[test]
    fn option_reads_and_writes() {
        assert!(matches!(
            parse_line(1, ":option").unwrap(),
            InputLine::Command(Command::GetOption { name: None, .. })
        ));
        assert!(matches!(
            parse_line(1, ":option api").unwrap(),
            InputLine::Command(Command::GetOption {
                name: Some(OptionName::Endpoint),
                ..
            })
        ));
        let InputLine::Command(Command::SetOptions { values, .. }) =
            parse_line(1, ":option api /googly/endpoint/").unwrap()
        else {
            panic!("expected set options");
        };
        assert_eq!(values[0].name(), OptionName::Endpoint);
        assert_eq!(values[0].to_string(), "/googly/endpoint/");
    }

    #[test]
    fn unknown_operation_is_invalid_invocation() {
        assert!(matches!(
            parse_line(1, ":invalidMethod"),
            Err(FieldError::InvalidInvocation(_))
        ));
        assert!(matches!(
            parse_line(1, ":option colour red"),
            Err(FieldError::InvalidInvocation(_))
        ));
    }
}
