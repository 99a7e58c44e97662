/// Builds a [`Style`](crate::view::Style) map from canonical keys.
///
/// Values go through [`serde_json::Value::from`], so strings, numbers and
/// booleans can be used directly.
///
/// ```
/// use islet::prelude::*;
///
/// let card = style! { "padding": 12, "backgroundColor": "#1C1C1E" };
/// let pressed = style! { "opacity": 0.6 };
/// let node = button("Open", "app://open").style([card, pressed]);
/// # let _ = node;
/// ```
#[macro_export]
macro_rules! style {
    () => {
        $crate::view::Style::Map($crate::__json::Map::new())
    };
    ($($key:literal : $value:expr),+ $(,)?) => {{
        let mut map = $crate::__json::Map::new();
        $(map.insert(::std::string::String::from($key), $crate::__json::Value::from($value));)+
        $crate::view::Style::Map(map)
    }};
}
