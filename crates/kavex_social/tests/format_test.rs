//! Tests for Discord to Minecraft text conversion.

use kavex_social::{MinecraftFormatter, pinged_names, underline_pings};
use std::collections::HashMap;

#[test]
fn test_inline_styles() {
    let formatter = MinecraftFormatter::new();
    assert_eq!(formatter.markdown("**bold**"), "§lbold§r");
    assert_eq!(formatter.markdown("__under__"), "§nunder§r");
    assert_eq!(formatter.markdown("~~gone~~"), "§mgone§r");
    assert_eq!(formatter.markdown("*soft*"), "§osoft§r");
    assert_eq!(formatter.markdown("_soft_"), "§osoft§r");
    assert_eq!(formatter.markdown("plain text"), "plain text");
}

#[test]
fn test_mixed_styles() {
    let formatter = MinecraftFormatter::new();
    assert_eq!(
        formatter.markdown("**loud** and *quiet*"),
        "§lloud§r and §oquiet§r"
    );
}

#[test]
fn test_code_spans() {
    let formatter = MinecraftFormatter::new();
    assert_eq!(formatter.markdown("run `/spawn`"), "run §0§a/spawn§r");
    assert_eq!(
        formatter.markdown("```java\nint x = 1;\n```"),
        "§0§aint x = 1;\n§r"
    );
    assert_eq!(formatter.markdown("```hello```"), "§0§ahello§r");
}

#[test]
fn test_raw_mentions_become_underlined_names() {
    let formatter = MinecraftFormatter::new();
    let users = HashMap::from([(42, "Alex".to_string())]);
    let roles = HashMap::from([(7, "Builders".to_string())]);

    assert_eq!(
        formatter.mentions("<@42> <@!42> <@&7>", &users, &roles),
        "§n@Alex§r §n@Alex§r §n@Builders§r"
    );
    assert_eq!(
        formatter.mentions("<@99>", &users, &roles),
        "§n@invalid-user§r"
    );
}

#[test]
fn test_full_conversion() {
    let formatter = MinecraftFormatter::new();
    let users = HashMap::from([(42, "Alex".to_string())]);
    assert_eq!(
        formatter.to_game_text("**hey** <@42>", &users, &HashMap::new()),
        "§lhey§r §n@Alex§r"
    );
}

#[test]
fn test_ping_detection() {
    let names = ["Steve", "Alex", "Notch"];
    assert_eq!(
        pinged_names("@steve and `@Alex` look", names),
        vec!["Steve".to_string(), "Alex".to_string()]
    );
    assert!(pinged_names("@Stevenson", names).is_empty());
    assert!(pinged_names("no pings", names).is_empty());
    assert_eq!(pinged_names("@Notch", names), vec!["Notch".to_string()]);
}

#[test]
fn test_ping_underline() {
    let names = vec!["Steve".to_string()];
    assert_eq!(underline_pings("hi @Steve", &names), "hi §n@Steve§r");
}
