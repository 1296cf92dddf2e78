#![allow(dead_code)]

use seqwatch::card::{extract_token_card, TokenCard};
use seqwatch::exec::ToolCommands;

/// Text of a complete token card, as the document extractor produces it.
pub const SAMPLE_CARD_TEXT: &str = "\
Test Peter Testesen (14567) | Expires: Feb 28, 2025
1 2 3 4 5 6 7 8
A iuh7 9iik lkmd ssuu sbna wyyh mkki aayh
B nnhs yyhh aamj wpod mcjy aakl qldo siah
C amaj weks 99jd ala9 smn6 aqq8 ssm8 xxuu
D 8a9a aakk 9w8d vmvu xxn7 65ee ddl9 xnh8
E xjs7 aak9 vv87 z765 c765 xx92 117h sslk
F mvnu xxb3 84fw ww66 aa83 sw78 11jr 725e
G a9au a7ue ve84 slxo x763 d7d7 l93w u756
H am12 lw92 ie7x m7tg 9hg6 7gbc cu72 si82
";

/// Rows A-H of [`SAMPLE_CARD_TEXT`], each as eight tokens.
pub const SAMPLE_ROWS: [[&str; 8]; 8] = [
    ["iuh7", "9iik", "lkmd", "ssuu", "sbna", "wyyh", "mkki", "aayh"],
    ["nnhs", "yyhh", "aamj", "wpod", "mcjy", "aakl", "qldo", "siah"],
    ["amaj", "weks", "99jd", "ala9", "smn6", "aqq8", "ssm8", "xxuu"],
    ["8a9a", "aakk", "9w8d", "vmvu", "xxn7", "65ee", "ddl9", "xnh8"],
    ["xjs7", "aak9", "vv87", "z765", "c765", "xx92", "117h", "sslk"],
    ["mvnu", "xxb3", "84fw", "ww66", "aa83", "sw78", "11jr", "725e"],
    ["a9au", "a7ue", "ve84", "slxo", "x763", "d7d7", "l93w", "u756"],
    ["am12", "lw92", "ie7x", "m7tg", "9hg6", "7gbc", "cu72", "si82"],
];

pub fn grid_from_rows(rows: [[&str; 8]; 8]) -> [[String; 8]; 8] {
    rows.map(|row| row.map(str::to_string))
}

/// The card encoded by [`SAMPLE_CARD_TEXT`], built directly.
pub fn sample_card() -> TokenCard {
    TokenCard::new(
        14567,
        "Test Peter Testesen",
        "Feb 28, 2025",
        grid_from_rows(SAMPLE_ROWS),
    )
}

/// The sample card, decoded from text.
pub fn extracted_sample_card() -> TokenCard {
    extract_token_card(SAMPLE_CARD_TEXT).expect("sample card text decodes")
}

/// Tool command lines with short, predictable paths.
pub fn sample_commands() -> ToolCommands {
    ToolCommands::new(
        "python3",
        "sg-upload-v2-wrapper.py",
        "adegen.py",
        "pw.txt",
        "user@example.org",
    )
}
