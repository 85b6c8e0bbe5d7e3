use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;

lazy_static! {
    /// Function-literal shapes: `x => ...`, `(a, b) => ...`, `function f(`.
    static ref FN_EXP_RE: Regex =
        Regex::new(r"^([\w$_]+|\([^)]*?\))\s*=>|^function(?:\s+[\w$]+)?\s*\(").unwrap();
    /// A single trailing parenthesized call suffix.
    static ref FN_INVOKE_RE: Regex = Regex::new(r"\([^)]*?\);*$").unwrap();
    /// Dotted / bracket-indexed property access ending in an identifier
    /// segment, usable as a direct function reference.
    static ref SIMPLE_PATH_RE: Regex = Regex::new(
        r#"^[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*|\['[^']*?']|\["[^"]*?"]|\[\d+]|\[[A-Za-z_$][\w$]*])*$"#,
    )
    .unwrap();
}

/// A parsed event binding: the raw handler expression plus its modifiers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventHandler {
    pub value: String,
    /// Binding-time qualifiers (`stop`, `ctrl`, `enter`, ...). `Some` even
    /// when empty changes codegen: the dispatch still forwards arguments.
    pub modifiers: Option<IndexMap<String, bool>>,
    /// The event *name* is itself a runtime expression.
    pub dynamic: bool,
}

impl EventHandler {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            modifiers: None,
            dynamic: false,
        }
    }

    pub fn with_modifiers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifiers = Some(names.into_iter().map(|n| (n.into(), true)).collect());
        self
    }
}

/// One event name may bind a single handler or an ordered sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Handlers {
    Single(EventHandler),
    Multiple(Vec<EventHandler>),
}

/// Insertion order is part of the generated-code contract.
pub type EventMap = IndexMap<String, Handlers>;

/// Emit the listener-binding expression for one element's event map.
///
/// Statically named handlers become an object literal; runtime-named ones
/// are merged in via the `_d` runtime helper. `is_native` selects the
/// `nativeOn:` prefix used for native events forced onto components.
pub fn gen_handlers(events: &EventMap, is_native: bool) -> String {
    let prefix = if is_native { "nativeOn:" } else { "on:" };
    let mut static_handlers = String::new();
    let mut dynamic_handlers = String::new();
    for (name, handler) in events {
        let handler_code = gen_handler(handler);
        if is_dynamic(handler) {
            dynamic_handlers.push_str(&format!("{name},{handler_code},"));
        } else {
            static_handlers.push_str(&format!("\"{name}\":{handler_code},"));
        }
    }
    let static_handlers = format!("{{{}}}", static_handlers.strip_suffix(',').unwrap_or(""));
    if dynamic_handlers.is_empty() {
        format!("{prefix}{static_handlers}")
    } else {
        format!(
            "{prefix}_d({static_handlers},[{}])",
            dynamic_handlers.strip_suffix(',').unwrap_or("")
        )
    }
}

fn is_dynamic(handler: &Handlers) -> bool {
    match handler {
        Handlers::Single(h) => h.dynamic,
        Handlers::Multiple(list) => {
            // A runtime-named event cannot bind a handler sequence; the
            // parser enforces this, so hitting it here is a usage error in
            // whatever produced the map.
            if list.iter().any(|h| h.dynamic) {
                log::warn!("dynamic event name bound to a handler array; treating as static");
                debug_assert!(false, "dynamic event name bound to a handler array");
            }
            false
        }
    }
}

fn gen_handler(handler: &Handlers) -> String {
    match handler {
        Handlers::Multiple(list) => {
            let parts: Vec<String> = list.iter().map(gen_single_handler).collect();
            format!("[{}]", parts.join(","))
        }
        Handlers::Single(h) => gen_single_handler(h),
    }
}

fn gen_single_handler(handler: &EventHandler) -> String {
    if handler.value.is_empty() {
        return "function(){}".to_string();
    }

    let is_method_path = SIMPLE_PATH_RE.is_match(&handler.value);
    let is_function_expression = FN_EXP_RE.is_match(&handler.value);
    let is_function_invocation =
        SIMPLE_PATH_RE.is_match(FN_INVOKE_RE.replace(&handler.value, "").as_ref());

    let Some(modifiers) = &handler.modifiers else {
        if is_method_path || is_function_expression {
            // Already denotes a callable; bind it directly.
            return handler.value.clone();
        }
        // Inline statement, e.g. `count++`, or a bare invocation.
        let body = if is_function_invocation {
            format!("return {}", handler.value)
        } else {
            handler.value.clone()
        };
        return format!("function($event){{{body}}}");
    };

    let mut code = String::new();
    let mut modifier_guards = String::new();
    let mut keys: Vec<&str> = Vec::new();
    for key in modifiers.keys() {
        if let Some(guard) = modifier_code(key) {
            modifier_guards.push_str(&guard);
            // `left`/`right` double as mouse-button guards and key aliases.
            if key_code_alias(key).is_some() {
                keys.push(key.as_str());
            }
        } else if key == "exact" {
            // Block unless exactly the requested modifier keys are held:
            // guard on the complement of what the other modifiers asked for.
            let condition = ["ctrl", "shift", "alt", "meta"]
                .iter()
                .filter(|m| !modifiers.get(**m).copied().unwrap_or(false))
                .map(|m| format!("$event.{m}Key"))
                .collect::<Vec<_>>()
                .join("||");
            modifier_guards.push_str(&gen_guard(&condition));
        } else {
            keys.push(key.as_str());
        }
    }
    if !keys.is_empty() {
        code.push_str(&gen_key_filter(&keys));
    }
    // Guards like stop/prevent must run after key filtering, so they never
    // fire for keys that do not match.
    code.push_str(&modifier_guards);

    let handler_code = if is_method_path {
        format!("return {}.apply(null, arguments)", handler.value)
    } else if is_function_expression {
        format!("return ({}).apply(null, arguments)", handler.value)
    } else if is_function_invocation {
        format!("return {}", handler.value)
    } else {
        handler.value.clone()
    };
    format!("function($event){{{code}{handler_code}}}")
}

/// Guards return null explicitly so the once-shell can tell a blocked
/// dispatch from a handled one.
fn gen_guard(condition: &str) -> String {
    format!("if({condition})return null;")
}

fn modifier_code(name: &str) -> Option<String> {
    let code = match name {
        "stop" => "$event.stopPropagation();".to_string(),
        "prevent" => "$event.preventDefault();".to_string(),
        "self" => gen_guard("$event.target !== $event.currentTarget"),
        "ctrl" => gen_guard("!$event.ctrlKey"),
        "shift" => gen_guard("!$event.shiftKey"),
        "alt" => gen_guard("!$event.altKey"),
        "meta" => gen_guard("!$event.metaKey"),
        "left" => gen_guard("'button' in $event && $event.button !== 0"),
        "middle" => gen_guard("'button' in $event && $event.button !== 1"),
        "right" => gen_guard("'button' in $event && $event.button !== 2"),
        _ => return None,
    };
    Some(code)
}

/// Key filters only apply to keyboard events: some browsers fire synthetic
/// non-keyboard events (autofill) carrying a bogus keyCode.
fn gen_key_filter(keys: &[&str]) -> String {
    format!(
        "if(!$event.type.indexOf('key')&&{})return null;",
        keys.iter()
            .map(|k| gen_filter_code(k))
            .collect::<Vec<_>>()
            .join("&&")
    )
}

fn gen_filter_code(key: &str) -> String {
    if let Some(key_val) = parse_key_code(key) {
        return format!("$event.keyCode!=={key_val}");
    }
    let key_code = json_or_undefined(key_code_alias(key));
    let key_name = json_or_undefined(key_name_alias(key));
    // Defer to the `_k` runtime helper: it also consults keycodes the
    // embedding application registered for this alias at runtime.
    format!(
        "_k($event.keyCode,{},{},$event.key,{})",
        json!(key),
        key_code,
        key_name
    )
}

/// A key whose leading digits read as a positive integer is a literal
/// keycode; zero falls through to the alias tables.
fn parse_key_code(key: &str) -> Option<u32> {
    let end = key
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(key.len());
    key[..end].parse::<u32>().ok().filter(|v| *v != 0)
}

fn json_or_undefined(v: Option<serde_json::Value>) -> String {
    match v {
        Some(v) => v.to_string(),
        None => "undefined".to_string(),
    }
}

/// Legacy `KeyboardEvent.keyCode` aliases.
fn key_code_alias(key: &str) -> Option<serde_json::Value> {
    let v = match key {
        "esc" => json!(27),
        "tab" => json!(9),
        "enter" => json!(13),
        "space" => json!(32),
        "up" => json!(38),
        "left" => json!(37),
        "right" => json!(39),
        "down" => json!(40),
        "delete" => json!([8, 46]),
        _ => return None,
    };
    Some(v)
}

/// `KeyboardEvent.key` aliases, with the legacy names old engines report.
fn key_name_alias(key: &str) -> Option<serde_json::Value> {
    let v = match key {
        "esc" => json!(["Esc", "Escape"]),
        "tab" => json!("Tab"),
        "enter" => json!("Enter"),
        "space" => json!([" ", "Spacebar"]),
        "up" => json!(["Up", "ArrowUp"]),
        "left" => json!(["Left", "ArrowLeft"]),
        "right" => json!(["Right", "ArrowRight"]),
        "down" => json!(["Down", "ArrowDown"]),
        "delete" => json!(["Backspace", "Delete", "Del"]),
        _ => return None,
    };
    Some(v)
}
