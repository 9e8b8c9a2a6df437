#[derive(Debug, confique::Config)]
pub struct GeneralConfig {
    /// Name of this installation. Used in the HTML `<title>` of menu pages
    /// and in their footer.
    #[config(default = "Bufibu Menu")]
    pub site_title: String,

    /// Shown after every price on the public menu, e.g. "320.00 ₺".
    #[config(default = "₺")]
    pub currency_symbol: String,
}

impl GeneralConfig {
    pub fn page_options(&self) -> crate::render::html::PageOptions<'_> {
        crate::render::html::PageOptions {
            site_title: &self.site_title,
            currency_symbol: &self.currency_symbol,
        }
    }
}
