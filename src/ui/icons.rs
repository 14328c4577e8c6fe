//! Shared UI icons and emojis.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR] ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[i] ");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "* ");

// Content indicators
pub static PEN: Emoji<'_, '_> = Emoji("📝 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static GLOBE: Emoji<'_, '_> = Emoji("🌐 ", "");
