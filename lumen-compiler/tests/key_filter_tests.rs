use lumen_compiler::events::{EventHandler, EventMap, Handlers, gen_handlers};
use pretty_assertions::assert_eq;

fn keyup(handler: EventHandler) -> EventMap {
    let mut events = EventMap::new();
    events.insert("keyup".to_string(), Handlers::Single(handler));
    events
}

#[test]
fn named_key_resolves_through_the_alias_tables() {
    let out = gen_handlers(&keyup(EventHandler::new("onEnter").with_modifiers(["enter"])), false);
    assert_eq!(
        out,
        r#"on:{"keyup":function($event){if(!$event.type.indexOf('key')&&_k($event.keyCode,"enter",13,$event.key,"Enter"))return null;return onEnter.apply(null, arguments)}}"#
    );
}

#[test]
fn numeric_key_compares_the_keycode_directly() {
    let out = gen_handlers(&keyup(EventHandler::new("foo").with_modifiers(["13"])), false);
    assert_eq!(
        out,
        r#"on:{"keyup":function($event){if(!$event.type.indexOf('key')&&$event.keyCode!==13)return null;return foo.apply(null, arguments)}}"#
    );
}

#[test]
fn keycode_parsing_stops_at_the_first_non_digit() {
    let out = gen_handlers(&keyup(EventHandler::new("foo").with_modifiers(["1a"])), false);
    assert!(out.contains("$event.keyCode!==1)"));
}

#[test]
fn zero_is_not_a_literal_keycode() {
    let out = gen_handlers(&keyup(EventHandler::new("foo").with_modifiers(["0"])), false);
    assert!(out.contains(r#"_k($event.keyCode,"0",undefined,$event.key,undefined)"#));
}

#[test]
fn legacy_aliases_carry_every_historic_code_and_name() {
    let out = gen_handlers(&keyup(EventHandler::new("onDelete").with_modifiers(["delete"])), false);
    assert!(out.contains(r#"_k($event.keyCode,"delete",[8,46],$event.key,["Backspace","Delete","Del"])"#));

    let out = gen_handlers(&keyup(EventHandler::new("onEsc").with_modifiers(["esc"])), false);
    assert!(out.contains(r#"_k($event.keyCode,"esc",27,$event.key,["Esc","Escape"])"#));

    let out = gen_handlers(&keyup(EventHandler::new("onSpace").with_modifiers(["space"])), false);
    assert!(out.contains(r#"_k($event.keyCode,"space",32,$event.key,[" ","Spacebar"])"#));
}

#[test]
fn unknown_key_defers_entirely_to_the_runtime_helper() {
    let out = gen_handlers(&keyup(EventHandler::new("onPlay").with_modifiers(["media-play"])), false);
    assert!(out.contains(r#"_k($event.keyCode,"media-play",undefined,$event.key,undefined)"#));
}

#[test]
fn key_filter_runs_before_side_effecting_guards() {
    // `prevent` is listed first but must not fire for non-matching keys.
    let out = gen_handlers(
        &keyup(EventHandler::new("submit").with_modifiers(["prevent", "enter"])),
        false,
    );
    assert_eq!(
        out,
        r#"on:{"keyup":function($event){if(!$event.type.indexOf('key')&&_k($event.keyCode,"enter",13,$event.key,"Enter"))return null;$event.preventDefault();return submit.apply(null, arguments)}}"#
    );
}

#[test]
fn left_doubles_as_button_guard_and_key_alias() {
    let out = gen_handlers(&keyup(EventHandler::new("onLeft").with_modifiers(["left"])), false);
    assert_eq!(
        out,
        r#"on:{"keyup":function($event){if(!$event.type.indexOf('key')&&_k($event.keyCode,"left",37,$event.key,["Left","ArrowLeft"]))return null;if('button' in $event && $event.button !== 0)return null;return onLeft.apply(null, arguments)}}"#
    );
}

#[test]
fn multiple_keys_all_have_to_miss_for_the_filter_to_block() {
    let out = gen_handlers(
        &keyup(EventHandler::new("move").with_modifiers(["up", "down"])),
        false,
    );
    assert_eq!(
        out,
        r#"on:{"keyup":function($event){if(!$event.type.indexOf('key')&&_k($event.keyCode,"up",38,$event.key,["Up","ArrowUp"])&&_k($event.keyCode,"down",40,$event.key,["Down","ArrowDown"]))return null;return move.apply(null, arguments)}}"#
    );
}
