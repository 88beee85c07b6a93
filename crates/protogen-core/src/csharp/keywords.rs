use std::borrow::Cow;

/// C# reserved words, sorted for binary search
const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Prefixes reserved words with `@`, the C# verbatim identifier marker
pub fn escape(identifier: &str) -> Cow<'_, str> {
    if CSHARP_KEYWORDS.binary_search(&identifier).is_ok() {
        Cow::Owned(format!("@{}", identifier))
    } else {
        Cow::Borrowed(identifier)
    }
}
