//! Static registry of the toolkit's tools, in display order.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    Network,
    System,
    Converters,
    Formatters,
    Encoders,
    Generators,
    Text,
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 7] = [
        ToolCategory::Network,
        ToolCategory::System,
        ToolCategory::Converters,
        ToolCategory::Formatters,
        ToolCategory::Encoders,
        ToolCategory::Generators,
        ToolCategory::Text,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ToolCategory::Network => "Network",
            ToolCategory::System => "System",
            ToolCategory::Converters => "Converters",
            ToolCategory::Formatters => "Formatters",
            ToolCategory::Encoders => "Encoders / Decoders",
            ToolCategory::Generators => "Generators",
            ToolCategory::Text => "Text",
        }
    }
}

/// One tool of the main window, consumed read-only by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: ToolCategory,
    pub keywords: &'static [&'static str],
}

static BUILTIN_TOOLS: [ToolDefinition; 22] = [
    ToolDefinition {
        id: "ports",
        name: "Ports",
        description: "Monitor listening ports and manage services",
        icon: "Radio",
        category: ToolCategory::Network,
        keywords: &["port", "network", "listen", "service", "tcp", "udp", "kill"],
    },
    ToolDefinition {
        id: "api-tester",
        name: "API Tester",
        description: "Send HTTP requests and inspect responses",
        icon: "Send",
        category: ToolCategory::Network,
        keywords: &["http", "request", "get", "post", "api", "fetch", "curl", "rest"],
    },
    ToolDefinition {
        id: "processes",
        name: "Processes",
        description: "Monitor running processes and memory usage",
        icon: "Activity",
        category: ToolCategory::System,
        keywords: &["process", "pid", "kill", "memory", "task", "manager"],
    },
    ToolDefinition {
        id: "number-base",
        name: "Number Base",
        description: "Convert numbers between decimal, hex, octal, binary",
        icon: "Binary",
        category: ToolCategory::Converters,
        keywords: &["number", "base", "hex", "decimal", "binary", "octal", "convert"],
    },
    ToolDefinition {
        id: "date-converter",
        name: "Date Converter",
        description: "Convert between Unix timestamps and human dates",
        icon: "Calendar",
        category: ToolCategory::Converters,
        keywords: &["date", "time", "unix", "timestamp", "epoch", "iso", "utc", "convert"],
    },
    ToolDefinition {
        id: "color-converter",
        name: "Color Converter",
        description: "Convert colors between HEX, RGB, and HSL",
        icon: "Palette",
        category: ToolCategory::Converters,
        keywords: &["color", "hex", "rgb", "hsl", "convert", "palette", "picker"],
    },
    ToolDefinition {
        id: "cron-parser",
        name: "Cron Parser",
        description: "Parse cron expressions to human-readable format",
        icon: "Timer",
        category: ToolCategory::Converters,
        keywords: &["cron", "schedule", "timer", "crontab", "parse"],
    },
    ToolDefinition {
        id: "json-formatter",
        name: "JSON Formatter",
        description: "Format, minify, and validate JSON data",
        icon: "Braces",
        category: ToolCategory::Formatters,
        keywords: &["json", "format", "pretty", "minify", "validate", "parse"],
    },
    ToolDefinition {
        id: "markdown-preview",
        name: "Markdown",
        description: "Preview markdown with live rendering",
        icon: "FileText",
        category: ToolCategory::Formatters,
        keywords: &["markdown", "md", "preview", "render", "format"],
    },
    ToolDefinition {
        id: "base64",
        name: "Base64",
        description: "Encode and decode Base64 text",
        icon: "FileCode",
        category: ToolCategory::Encoders,
        keywords: &["base64", "encode", "decode", "text", "binary"],
    },
    ToolDefinition {
        id: "url-encoder",
        name: "URL Encoder",
        description: "Encode and decode URL components",
        icon: "Link",
        category: ToolCategory::Encoders,
        keywords: &["url", "encode", "decode", "percent", "uri", "component"],
    },
    ToolDefinition {
        id: "html-encoder",
        name: "HTML Encoder",
        description: "Encode and decode HTML entities",
        icon: "Code",
        category: ToolCategory::Encoders,
        keywords: &["html", "entity", "encode", "decode", "escape", "unescape"],
    },
    ToolDefinition {
        id: "jwt-decoder",
        name: "JWT Decoder",
        description: "Decode and inspect JSON Web Tokens",
        icon: "KeyRound",
        category: ToolCategory::Encoders,
        keywords: &["jwt", "token", "decode", "json", "web", "auth", "bearer"],
    },
    ToolDefinition {
        id: "uuid-generator",
        name: "UUID Generator",
        description: "Generate random UUIDs (v4)",
        icon: "Fingerprint",
        category: ToolCategory::Generators,
        keywords: &["uuid", "guid", "random", "generate", "id", "unique"],
    },
    ToolDefinition {
        id: "hash-generator",
        name: "Hash Generator",
        description: "Calculate SHA-1, SHA-256, SHA-384, SHA-512 hashes",
        icon: "ShieldCheck",
        category: ToolCategory::Generators,
        keywords: &["hash", "sha", "sha256", "sha512", "checksum", "digest"],
    },
    ToolDefinition {
        id: "password-generator",
        name: "Password",
        description: "Generate secure random passwords",
        icon: "Lock",
        category: ToolCategory::Generators,
        keywords: &["password", "generate", "random", "secure", "strong"],
    },
    ToolDefinition {
        id: "lorem-ipsum",
        name: "Lorem Ipsum",
        description: "Generate placeholder text",
        icon: "TextCursorInput",
        category: ToolCategory::Generators,
        keywords: &["lorem", "ipsum", "placeholder", "text", "dummy"],
    },
    ToolDefinition {
        id: "qr-code",
        name: "QR Code Generator",
        description: "Generate QR codes from text, URLs, WiFi, email & phone",
        icon: "QrCode",
        category: ToolCategory::Generators,
        keywords: &["qr", "qrcode", "barcode", "scan", "url", "wifi", "link"],
    },
    ToolDefinition {
        id: "gradient-builder",
        name: "Gradient Builder",
        description: "Create beautiful gradients with live preview and code export",
        icon: "Palette",
        category: ToolCategory::Generators,
        keywords: &["gradient", "color", "css", "linear", "radial", "conic", "background", "design", "tailwind"],
    },
    ToolDefinition {
        id: "regex-tester",
        name: "Regex Tester",
        description: "Test regular expressions with live highlighting",
        icon: "Regex",
        category: ToolCategory::Text,
        keywords: &["regex", "regexp", "regular expression", "pattern", "match", "test"],
    },
    ToolDefinition {
        id: "text-diff",
        name: "Text Diff",
        description: "Compare two texts and highlight differences",
        icon: "GitCompareArrows",
        category: ToolCategory::Text,
        keywords: &["diff", "compare", "text", "difference", "merge"],
    },
    ToolDefinition {
        id: "data-converter",
        name: "YAML / JSON / TOML",
        description: "Convert between YAML, JSON, and TOML formats",
        icon: "ArrowLeftRight",
        category: ToolCategory::Converters,
        keywords: &[
            "yaml", "json", "toml", "convert", "converter", "transform", "config", "configuration", "data", "format",
        ],
    },
];

pub fn builtin_tools() -> &'static [ToolDefinition] {
    &BUILTIN_TOOLS
}

pub fn find_tool(id: &str) -> Option<&'static ToolDefinition> {
    BUILTIN_TOOLS.iter().find(|t| t.id == id)
}

/// Tools grouped by category, categories in their fixed order.
pub fn tools_by_category() -> Vec<(ToolCategory, Vec<&'static ToolDefinition>)> {
    ToolCategory::ALL
        .iter()
        .map(|cat| (*cat, BUILTIN_TOOLS.iter().filter(|t| t.category == *cat).collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_order_and_size() {
        let tools = builtin_tools();
        assert_eq!(tools.len(), 22);
        assert_eq!(tools[0].id, "ports");
        assert_eq!(tools[1].id, "api-tester");
        assert_eq!(tools[21].id, "data-converter");
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<&str> = builtin_tools().iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), builtin_tools().len());
    }

    #[test]
    fn test_navigation_targets_exist() {
        // tools targeted by smart actions and port actions
        for id in ["qr-code", "data-converter", "api-tester"] {
            assert!(find_tool(id).is_some(), "missing {}", id);
        }
        assert!(find_tool("nope").is_none());
    }

    #[test]
    fn test_grouping_covers_every_tool() {
        let grouped = tools_by_category();
        assert_eq!(grouped.len(), 7);
        let total: usize = grouped.iter().map(|(_, tools)| tools.len()).sum();
        assert_eq!(total, 22);
        assert_eq!(grouped[0].0.label(), "Network");
        assert_eq!(grouped[0].1.len(), 2);
    }
}
