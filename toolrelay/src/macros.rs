/// Builds a tool [`Parameters`](crate::Parameters) map from key/value pairs.
///
/// ```rust
/// use toolrelay::tr_params;
///
/// let params = tr_params! { "query" => "from:alice@example.com", "max_results" => 3 };
/// assert_eq!(params.get("max_results"), Some(&serde_json::json!(3)));
/// assert!(tr_params! {}.is_empty());
/// ```
#[macro_export]
macro_rules! tr_params {
    () => {
        $crate::Parameters::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::Parameters::new();
        $(params.insert(::std::string::String::from($key), $crate::serde_json::json!($value));)+
        params
    }};
}

/// Builds a [`ToolCallRequest`](crate::ToolCallRequest) for a named tool.
///
/// ```rust
/// use toolrelay::tr_call;
///
/// let request = tr_call!("get_email_full", "id" => "demo-1");
/// assert_eq!(request.tool_name, "get_email_full");
/// assert_eq!(request.parameters.len(), 1);
/// ```
#[macro_export]
macro_rules! tr_call {
    ($tool:expr $(,)?) => {
        $crate::ToolCallRequest::new($tool, $crate::Parameters::new())
    };
    ($tool:expr, $($key:expr => $value:expr),+ $(,)?) => {
        $crate::ToolCallRequest::new($tool, $crate::tr_params!($($key => $value),+))
    };
}
