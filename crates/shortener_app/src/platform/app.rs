use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use serde_json::Value;
use shortener_core::{
    Command, FailureKind, FieldError, FieldId, FieldOptions, FieldRegistry, OptionName, Reply,
    Settlement, ShortenRequest, TransportError,
};
use shortener_engine::EngineError;
use shortener_logging::{shortener_debug, shortener_info, shortener_warn};

use super::config::{AppConfig, COMMANDS};
use super::effects::EffectRunner;
use super::input::{parse_line, InputLine};
use super::msg::AppMsg;

const FIELD: FieldId = 1;

pub fn run(config: AppConfig) -> anyhow::Result<()> {
    let (msg_tx, msg_rx) = mpsc::channel::<AppMsg>();
    let settings = config.transport.to_settings()?;
    let runner = EffectRunner::new(settings, msg_tx.clone())?;

    let defaults = with_terminal_hooks(config.field, config.response_field, msg_tx.clone());
    let mut registry = FieldRegistry::with_defaults(defaults);
    registry.attach(FIELD, [])?;

    spawn_stdin_reader(msg_tx);

    let mut field_value = String::new();
    let mut input_closed = false;
    while let Ok(msg) = msg_rx.recv() {
        match msg {
            AppMsg::Line(line) if line.trim().is_empty() => {}
            AppMsg::Line(line) => match parse_line(FIELD, &line) {
                Ok(InputLine::Quit) => break,
                Ok(InputLine::Help) => println!("{COMMANDS}"),
                Ok(InputLine::Command(command)) => {
                    if let Command::ValueChanged { value, .. } = &command {
                        field_value = value.clone();
                    }
                    let reply = registry.dispatch(command);
                    handle_reply(reply, &mut registry, &runner);
                }
                Err(err) => eprintln!("{err}"),
            },
            AppMsg::Settled(settlement) => {
                registry.settle(settlement);
            }
            AppMsg::ReplaceValue { field, value } => {
                shortener_debug!("Field {} value {:?} -> {:?}", field, field_value, value);
                field_value = value;
            }
            AppMsg::InputClosed => input_closed = true,
        }

        let in_flight = registry
            .status(FIELD)
            .is_some_and(|status| status.request_in_flight);
        if input_closed && !in_flight {
            break;
        }
    }

    shortener_info!("Shutting down; last field value {:?}", field_value);
    Ok(())
}

fn handle_reply(
    reply: Result<Reply, FieldError>,
    registry: &mut FieldRegistry,
    runner: &EffectRunner,
) {
    match reply {
        Ok(Reply::Request(request)) => {
            submit_or_settle(registry, request, |request| runner.submit(request));
        }
        Ok(Reply::Option(value)) => println!("{}: {value}", value.name()),
        Ok(Reply::Options(options)) => {
            for name in OptionName::ALL {
                println!("{name}: {}", options.get(name));
            }
        }
        Ok(Reply::Done | Reply::Settled(_)) => {}
        Err(err) => eprintln!("{err}"),
    }
}

/// Hands a request to the engine. When the engine refuses it, the request is
/// settled as a network failure so the field leaves the in-flight state.
fn submit_or_settle(
    registry: &mut FieldRegistry,
    request: ShortenRequest,
    submit: impl FnOnce(ShortenRequest) -> Result<(), EngineError>,
) {
    let pending = request.clone();
    if let Err(err) = submit(request) {
        shortener_warn!("Field {} request not sent: {}", pending.field, err);
        let failure = TransportError::new(FailureKind::Network, err.to_string());
        registry.settle(Settlement::new(&pending, Err(failure)));
    }
}

/// Installs hooks that render field activity on the terminal and feed the
/// shortened link back as the new field value.
fn with_terminal_hooks(
    options: FieldOptions,
    response_field: Option<String>,
    msg_tx: mpsc::Sender<AppMsg>,
) -> FieldOptions {
    options
        .on_invalid_url(|url, _| println!("not a url: {url}"))
        .on_before_send(|status| shortener_debug!("Field {} sending", status.field))
        .on_success(move |body, status| {
            let value = short_link(body, response_field.as_deref());
            println!("{value}");
            let _ = msg_tx.send(AppMsg::ReplaceValue {
                field: status.field,
                value,
            });
        })
        .on_error(|err, _| eprintln!("shortening failed: {err}"))
}

/// Picks the short link out of a success body.
fn short_link(body: &Value, response_field: Option<&str>) -> String {
    let picked = match response_field {
        Some(key) => body.get(key).unwrap_or(body),
        None => body,
    };
    match picked {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn spawn_stdin_reader(msg_tx: mpsc::Sender<AppMsg>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if msg_tx.send(AppMsg::Line(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    eprintln!("stdin error: {err}");
                    break;
                }
            }
        }
        let _ = msg_tx.send(AppMsg::InputClosed);
    });
}
