use std::fmt;


/// A lazy `fmt` formatter, specified by a callable. Usually created via
/// `lazy_format!`.
///
/// This is particularly useful in situations where you want a method to return
/// a formatted value, but don't want to return an allocated `String`. For
/// example, if the returned value is formatted into yet another value anyway,
/// allocating a string is useless. Instead of returning `String`, you then
/// return `impl fmt::Display + '_`.
pub(crate) struct LazyFormat<F: Fn(&mut fmt::Formatter) -> fmt::Result>(pub F);

impl<F> fmt::Display for LazyFormat<F>
where
    F: Fn(&mut fmt::Formatter) -> fmt::Result,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.0)(f)
    }
}

macro_rules! lazy_format {
    ($fmt:literal $($t:tt)*) => {
        crate::util::LazyFormat(move |f| write!(f, $fmt $($t)*))
    };
}

pub(crate) use lazy_format;


/// Formats the inner string with HTML special characters escaped. Safe for
/// text content and quoted attribute values.
pub(crate) struct HtmlEscaped<'a>(pub &'a str);

impl fmt::Display for HtmlEscaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = self.0;
        while let Some(pos) = rest.find(['&', '<', '>', '"', '\'']) {
            f.write_str(&rest[..pos])?;
            f.write_str(match rest.as_bytes()[pos] {
                b'&' => "&amp;",
                b'<' => "&lt;",
                b'>' => "&gt;",
                b'"' => "&quot;",
                _ => "&#39;",
            })?;
            rest = &rest[pos + 1..];
        }
        f.write_str(rest)
    }
}

/// Formats a user supplied value for use inside an inline `style` attribute.
/// Everything that could end the declaration or the attribute is dropped, so
/// `"2rem; position: fixed"` becomes `"2rem position fixed"`.
pub(crate) struct CssValue<'a>(pub &'a str);

impl fmt::Display for CssValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '#' | '.' | ',' | '%' | '-' | '_'))
            .try_for_each(|c| fmt::Write::write_char(f, c))
    }
}

/// Formats a URL for use in CSS `url('...')` inside a `style` attribute.
pub(crate) struct CssUrl<'a>(pub &'a str);

impl fmt::Display for CssUrl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '\'' => f.write_str("%27")?,
                '"' => f.write_str("%22")?,
                '(' => f.write_str("%28")?,
                ')' => f.write_str("%29")?,
                '\\' => f.write_str("%5C")?,
                '<' => f.write_str("%3C")?,
                '>' => f.write_str("%3E")?,
                '&' => f.write_str("&amp;")?,
                c if c.is_whitespace() || c.is_control() => {}
                c => fmt::Write::write_char(f, c)?,
            }
        }
        Ok(())
    }
}
