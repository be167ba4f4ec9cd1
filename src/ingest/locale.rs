// src/ingest/locale.rs
//! Script-based locale guess for region-sensitive search endpoints (Google News).

/// `hl` / `gl` / `ceid` parameters as Google News expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    pub hl: &'static str,
    pub gl: &'static str,
    pub ceid: &'static str,
}

pub const LOCALE_ZH_CN: Locale = Locale {
    hl: "zh-CN",
    gl: "CN",
    ceid: "CN:zh-Hans",
};
pub const LOCALE_JA: Locale = Locale {
    hl: "ja",
    gl: "JP",
    ceid: "JP:ja",
};
pub const LOCALE_KO: Locale = Locale {
    hl: "ko",
    gl: "KR",
    ceid: "KR:ko",
};
pub const LOCALE_EN_US: Locale = Locale {
    hl: "en-US",
    gl: "US",
    ceid: "US:en",
};

fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

fn is_kana(c: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&c) || ('\u{30A0}'..='\u{30FF}').contains(&c)
}

fn is_hangul(c: char) -> bool {
    ('\u{AC00}'..='\u{D7AF}').contains(&c)
}

/// First match wins: ideographs, then kana, then hangul, else US English.
/// Japanese text containing kanji therefore resolves to the Chinese locale.
pub fn detect_locale(query: &str) -> Locale {
    if query.chars().any(is_cjk_ideograph) {
        LOCALE_ZH_CN
    } else if query.chars().any(is_kana) {
        LOCALE_JA
    } else if query.chars().any(is_hangul) {
        LOCALE_KO
    } else {
        LOCALE_EN_US
    }
}
