//! Built-in style classes.
//!
//! [`core`] is the flexbox base every component starts from: colors, size,
//! padding, borders, gutters between children, and rounding. [`inline`] and
//! [`active`] are partial classes meant to be composed over it:
//!
//! ```rust
//! use ctyled::classes;
//!
//! let button = classes::core()
//!     .compose(&classes::inline())
//!     .and_then(|c| c.compose(&classes::active()))
//!     .unwrap();
//! assert!(button.config("hover").is_some());
//! ```

use crate::class::{PropertyConfig, StyleClass};
use crate::color::Color;
use crate::template::TemplateFragment;
use crate::util::{px, round, scalar};
use crate::value::{PropertySet, Value, format_number};

/// Document-level rules installed once by [`crate::StyleSheet::install_base_styles`].
pub const BASE_STYLES: &str = "body {
  position: absolute;
  width: 100%;
  height: 100%;
  margin: 0;
  font-family: -apple-system, BlinkMacSystemFont, \"Segoe UI\", Helvetica, Arial, sans-serif;
  font-weight: 400;
  color: #424242;
  font-size: 14px;
}
a {
  text-decoration: none;
  color: inherit;
}
";

fn flag(props: &PropertySet, name: &str) -> bool {
    props.is_truthy(name)
}

fn size(props: &PropertySet) -> f64 {
    props.number("size").unwrap_or(0.0)
}

fn fg(color: Option<&Color>) -> String {
    color.map(|c| c.fg().to_hex()).unwrap_or_default()
}

fn bg(color: Option<&Color>) -> String {
    color.map(|c| c.bg().to_hex()).unwrap_or_default()
}

/// `size` in px multiplied by a length property, or a string length as is.
fn length(props: &PropertySet, name: &str) -> Value {
    match props.get(name) {
        v if !v.is_truthy() => v.clone(),
        Value::Number(n) => Value::Str(px(n * size(props))),
        other => Value::Str(other.to_string()),
    }
}

fn when(cond: bool, value: impl Into<Value>) -> Value {
    if cond { value.into() } else { Value::Unset }
}

/// The base class.
pub fn core() -> StyleClass {
    StyleClass::new()
        .prop("color", PropertyConfig::new().with_default(Color::default()).inherit())
        .prop(
            "borderColor",
            PropertyConfig::new()
                .extends("color")
                .derive(|c: &Value| c.as_color().map(|c| c.invert().nudge(0.3))),
        )
        .prop("bgColor", PropertyConfig::new().extends("color"))
        .prop("size", PropertyConfig::new().with_default(14).inherit())
        .prop("width", PropertyConfig::new())
        .prop("height", PropertyConfig::new())
        .prop("bg", PropertyConfig::new().with_default(false))
        .prop("border", PropertyConfig::new())
        .prop("padd", PropertyConfig::new())
        .prop("column", PropertyConfig::new())
        .prop("reverse", PropertyConfig::new())
        .prop("justify", PropertyConfig::new().with_default("flex-start"))
        .prop("flex", PropertyConfig::new().with_default("none"))
        .prop("alignSelf", PropertyConfig::new().with_default(""))
        .prop("align", PropertyConfig::new().with_default("stretch"))
        .prop("gutter", PropertyConfig::new().with_default(false))
        .prop("lined", PropertyConfig::new())
        .prop("endLine", PropertyConfig::new())
        .prop("scroll", PropertyConfig::new())
        .prop("disabled", PropertyConfig::new())
        .prop("rounded", PropertyConfig::new())
        .prop("flatLeft", PropertyConfig::new())
        .prop("flatRight", PropertyConfig::new())
        .prop("flatTop", PropertyConfig::new())
        .prop("flatBottom", PropertyConfig::new())
        .prop("noselect", PropertyConfig::new())
        .inline_fn("background", |p: &PropertySet| {
            when(flag(p, "bg"), bg(p.color("bgColor")))
        })
        .inline_fn("color", |p: &PropertySet| fg(p.color("color")))
        .inline_fn("fontSize", |p: &PropertySet| px(size(p)))
        .inline_fn("padding", |p: &PropertySet| {
            when(flag(p, "padd"), px(size(p) / 2.0 * scalar(p.get("padd"))))
        })
        .inline_fn("flexDirection", |p: &PropertySet| {
            let axis = if flag(p, "column") { "column" } else { "row" };
            let suffix = if flag(p, "reverse") { "-reverse" } else { "" };
            format!("{axis}{suffix}")
        })
        .inline_fn("alignItems", |p: &PropertySet| p.get("align").clone())
        .inline_fn("justifyContent", |p: &PropertySet| p.get("justify").clone())
        .inline_fn("flex", |p: &PropertySet| p.get("flex").clone())
        .inline_fn("alignSelf", |p: &PropertySet| p.get("alignSelf").clone())
        .inline_fn("overflowX", |p: &PropertySet| {
            when(flag(p, "scroll") && !flag(p, "column"), "scroll")
        })
        .inline_fn("overflowY", |p: &PropertySet| {
            when(flag(p, "scroll") && flag(p, "column"), "scroll")
        })
        .inline_fn("pointerEvents", |p: &PropertySet| when(flag(p, "disabled"), "none"))
        .inline_fn("opacity", |p: &PropertySet| when(flag(p, "disabled"), 0.7))
        .inline_fn("borderRadius", border_radius)
        .inline_fn("width", |p: &PropertySet| length(p, "width"))
        .inline_fn("height", |p: &PropertySet| length(p, "height"))
        .inline_fn("userSelect", |p: &PropertySet| when(flag(p, "noselect"), "none"))
        .template(core_sheet())
}

fn border_radius(p: &PropertySet) -> String {
    if !flag(p, "rounded") {
        return "none".to_string();
    }
    let radius = format_number(round(size(p) / 6.0 * scalar(p.get("rounded"))));
    let corner = |flat: bool| if flat { "0".to_string() } else { radius.clone() };
    let (top, left, right, bottom) = (
        flag(p, "flatTop"),
        flag(p, "flatLeft"),
        flag(p, "flatRight"),
        flag(p, "flatBottom"),
    );
    format!(
        "{}px {}px {}px {}px",
        corner(top || left),
        corner(top || right),
        corner(right || bottom),
        corner(left || bottom)
    )
}

/// Child-selector positions, swapped when the layout is reversed.
fn ends(p: &PropertySet) -> (&'static str, &'static str) {
    if flag(p, "reverse") { ("last", "first") } else { ("first", "last") }
}

/// Leading and trailing box sides along the main axis.
fn sides(p: &PropertySet) -> (&'static str, &'static str) {
    if flag(p, "column") { ("top", "bottom") } else { ("left", "right") }
}

fn core_sheet() -> TemplateFragment {
    TemplateFragment::builder()
        .text(
            "\n  position: relative;\n  box-sizing: border-box;\n  display: flex;\n  background-clip: border-box;\n\n  border: ",
        )
        .value(|p: &PropertySet, _: &PropertySet| {
            if flag(p, "border") {
                format!(
                    "{}px solid {}",
                    format_number(scalar(p.get("border"))),
                    fg(p.color("borderColor"))
                )
            } else {
                "none".to_string()
            }
        })
        .text(";\n\n  ")
        .value(|p: &PropertySet, _: &PropertySet| {
            if !flag(p, "gutter") {
                return Value::Unset;
            }
            let (first, last) = ends(p);
            let (start, end) = sides(p);
            let amount = px(size(p) / 4.0 * scalar(p.get("gutter")));
            let spacing = if flag(p, "lined") { "padding" } else { "margin" };
            Value::Str(format!(
                "\n  > :not(:{first}-child) {{\n    {spacing}-{start}:{amount};\n  }}\n  > :not(:{last}-child) {{\n    margin-{end}:{amount};\n  }}\n"
            ))
        })
        .text("\n  ")
        .value(|p: &PropertySet, _: &PropertySet| {
            if !flag(p, "lined") {
                return Value::Unset;
            }
            let (first, _) = ends(p);
            let (start, _) = sides(p);
            Value::Str(format!(
                "\n  > :not(:{first}-child) {{\n    border-{start}:{}px solid {} !important;\n  }}\n",
                format_number(scalar(p.get("lined"))),
                fg(p.color("borderColor"))
            ))
        })
        .text("\n  ")
        .value(|p: &PropertySet, _: &PropertySet| {
            if !(flag(p, "lined") && flag(p, "endLine")) {
                return Value::Unset;
            }
            let (_, last) = ends(p);
            let (_, end) = sides(p);
            Value::Str(format!(
                "\n  > :{last}-child {{\n    border-{end}:{}px solid {} !important;\n  }}\n",
                format_number(scalar(p.get("lined"))),
                fg(p.color("borderColor"))
            ))
        })
        .text("\n")
        .build()
}

/// Inline-flex variant: background and rounding on by default, tighter
/// gutters, and a fixed one-pixel border.
pub fn inline() -> StyleClass {
    StyleClass::new()
        .prop("bg", PropertyConfig::new().with_default(true))
        .prop("rounded", PropertyConfig::new().with_default(true))
        .inline_fn("padding", |p: &PropertySet| {
            let padd = scalar(p.get("padd"));
            when(
                flag(p, "padd"),
                format!(
                    "{}px {}px",
                    format_number(size(p) / 4.0 * padd),
                    format_number(size(p) / 2.0 * padd)
                ),
            )
        })
        .template(
            TemplateFragment::builder()
                .text("\n  display: inline-flex;\n\n  border: ")
                .value(|p: &PropertySet, _: &PropertySet| {
                    if flag(p, "border") {
                        format!("1px solid {}", fg(p.color("borderColor")))
                    } else {
                        "none".to_string()
                    }
                })
                .text(";\n\n  ")
                .value(|p: &PropertySet, _: &PropertySet| {
                    if !flag(p, "gutter") {
                        return Value::Unset;
                    }
                    let (start, end) = sides(p);
                    let amount = px(size(p) / 8.0 * scalar(p.get("gutter")));
                    Value::Str(format!(
                        "\n  > :not(:first-child) {{\n    margin-{start}:{amount};\n  }}\n  > :not(:last-child) {{\n    margin-{end}:{amount};\n  }}\n"
                    ))
                })
                .text("\n")
                .build(),
        )
}

/// Interactive variant: hover and active color shifts, pointer cursor, and
/// a focus outline.
pub fn active() -> StyleClass {
    StyleClass::new()
        .prop("hover", PropertyConfig::new().with_default(true))
        .prop("active", PropertyConfig::new().with_default(false))
        .inline_fn("outlineColor", |p: &PropertySet| bg(p.color("color")))
        .inline_fn("cursor", |p: &PropertySet| {
            if flag(p, "disabled") { "inherit" } else { "pointer" }
        })
        .inline_fn("outlineWidth", |p: &PropertySet| px(size(p) / 5.0))
        .template(
            TemplateFragment::builder()
                .text("\n  user-select: none;\n  outline-offset: -2px;\n\n  ")
                .value(|p: &PropertySet, _: &PropertySet| {
                    when(
                        flag(p, "hover") && flag(p, "bg"),
                        format!(
                            "\n  &:hover {{\n    background:{} !important;\n  }}\n",
                            pressed_background(p)
                        ),
                    )
                })
                .text("\n  ")
                .value(|p: &PropertySet, _: &PropertySet| {
                    when(
                        flag(p, "active") && flag(p, "bg"),
                        format!("\n  background:{} !important;\n", pressed_background(p)),
                    )
                })
                .text("\n  ")
                .value(|p: &PropertySet, _: &PropertySet| {
                    when(
                        flag(p, "hover"),
                        format!(
                            "\n  &:hover {{\n    color:{} !important;\n  }}\n",
                            pressed_foreground(p)
                        ),
                    )
                })
                .text("\n  ")
                .value(|p: &PropertySet, _: &PropertySet| {
                    when(
                        flag(p, "active"),
                        format!("\n  color:{} !important;\n", pressed_foreground(p)),
                    )
                })
                .text("\n")
                .build(),
        )
}

fn pressed_background(p: &PropertySet) -> String {
    let amount = -0.15 * scalar(p.get("hover"));
    bg(p.color("bgColor").map(|c| c.nudge(amount)).as_ref())
}

fn pressed_foreground(p: &PropertySet) -> String {
    let amount = (if flag(p, "bg") { -0.2 } else { 0.8 }) * scalar(p.get("hover"));
    fg(p.color("color").map(|c| c.nudge(amount)).as_ref())
}
