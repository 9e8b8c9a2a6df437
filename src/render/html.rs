//! Writes the rendered blocks as a standalone HTML page. All styling comes
//! from the theme: fonts and alignment from the typography role of each text,
//! colors from the matching color role.

use std::fmt::{self, Display, Write as _};

use crate::{
    store::{Product, Restaurant},
    theme::{AdvancedSettings, Background, TextStyle},
    util::{lazy_format, CssUrl, CssValue, HtmlEscaped},
};
use super::{render_blocks, CategorySection, ExpandedCategories, MenuData, RenderedBlock};


/// Page wide settings that do not come from the theme.
#[derive(Debug, Clone, Copy)]
pub struct PageOptions<'a> {
    pub site_title: &'a str,
    pub currency_symbol: &'a str,
}

const BASE_CSS: &str = "\
    *{box-sizing:border-box}\
    body{margin:0;min-height:100vh;position:relative}\
    main{position:relative;max-width:48rem;margin:0 auto;padding-bottom:2rem}\
    .layered{position:relative;overflow:hidden}\
    .layered>.bg,.layered>.overlay{position:absolute;inset:0;pointer-events:none}\
    .layered>.bg{background-size:cover;background-position:center}\
    .layered>.content{position:relative}\
    header .content{padding:2rem 1rem;text-align:center}\
    header h1,header p{margin:.25rem 0}\
    .social{display:flex;gap:.75rem;justify-content:center;margin-top:.75rem}\
    .social a{text-decoration:none}\
    .hero{display:flex;gap:.5rem;overflow-x:auto;padding:1rem}\
    .hero figure{margin:0;flex:0 0 80%;position:relative}\
    .hero img{width:100%;border-radius:.5rem;display:block}\
    .label{display:inline-block;padding:.25rem .75rem;border-radius:1rem}\
    .featured,.categories{padding:1rem}\
    .card{border-radius:.5rem;margin-bottom:.75rem;padding:.75rem}\
    .product{display:grid;grid-template-columns:1fr auto;gap:.25rem .75rem;padding:.5rem 0}\
    .product h3,.product p{margin:0}\
    .product .description{grid-column:1/3}\
    .products{list-style:none;margin:0;padding:0}\
    summary{cursor:pointer;list-style:none}\
    .ad-button{display:block;margin:1rem;padding:.75rem;border-radius:.5rem;text-align:center;\
        text-decoration:none}\
    footer .content{padding:1.5rem 1rem;text-align:center}\
    @keyframes bufibu-klasik-in{from{opacity:0;transform:translateY(-.5rem)}to{opacity:1}}\
    .anim-bufibu-klasik details[open] .products{animation:bufibu-klasik-in .35s ease-out}\
";


/// Renders the public menu page.
pub fn menu_page(
    settings: &AdvancedSettings,
    data: &MenuData,
    expanded: &ExpandedCategories,
    options: PageOptions<'_>,
) -> String {
    let blocks = render_blocks(settings, data, expanded);
    MenuPage { settings, restaurant: &data.restaurant, blocks, options }.to_string()
}

/// A minimal page shown instead of the menu when loading it failed.
pub fn error_page(title: &str, message: &str, options: PageOptions<'_>) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"tr\"><head><meta charset=\"utf-8\">\
            <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
            <title>{title} · {site}</title></head>\
            <body style=\"font-family:sans-serif;text-align:center;padding:3rem 1rem\">\
            <h1>{title}</h1><p>{message}</p></body></html>\n",
        title = HtmlEscaped(title),
        message = HtmlEscaped(message),
        site = HtmlEscaped(options.site_title),
    )
}

/// Formats a price like `320.00 ₺`.
pub fn format_price(price: f64, currency_symbol: &str) -> String {
    format!("{price:.2} {currency_symbol}")
}


struct MenuPage<'a> {
    settings: &'a AdvancedSettings,
    restaurant: &'a Restaurant,
    blocks: Vec<RenderedBlock<'a>>,
    options: PageOptions<'a>,
}

impl Display for MenuPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.settings;
        write!(
            f,
            "<!DOCTYPE html>\n<html lang=\"tr\"><head><meta charset=\"utf-8\">\
                <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
                <title>{} · {}</title><style>{BASE_CSS}</style></head>\n",
            HtmlEscaped(&self.restaurant.name),
            HtmlEscaped(self.options.site_title),
        )?;

        write!(f, "<body class=\"layered\" style=\"background-color:{}\">", CssValue(&s.colors.body))?;
        layers(f, &s.backgrounds.global, &s.colors.body)?;
        writeln!(f, "<main class=\"anim-{}\">", s.components.category_animation.kind)?;

        for block in &self.blocks {
            self.block(f, block)?;
            f.write_char('\n')?;
        }

        f.write_str("</main></body></html>\n")
    }
}

impl MenuPage<'_> {
    fn block(&self, f: &mut fmt::Formatter<'_>, block: &RenderedBlock<'_>) -> fmt::Result {
        let s = self.settings;
        let colors = &s.colors;
        let typo = &s.typography;

        match block {
            RenderedBlock::Header { restaurant } => {
                let header = &s.components.header;
                write!(f, "<header class=\"layered\" style=\"background-color:{}\">", CssValue(&colors.header))?;
                layers(f, &s.backgrounds.sections.header, &colors.header)?;
                f.write_str("<div class=\"content\">")?;
                if let Some(logo) = &restaurant.logo_url {
                    write!(
                        f,
                        "<img class=\"logo\" src=\"{}\" alt=\"\" style=\"height:{}px\">",
                        HtmlEscaped(logo),
                        header.logo_size.pixels(),
                    )?;
                }
                write!(
                    f,
                    "<h1 style=\"{}\">{}</h1>",
                    text_style(&typo.restaurant_name, &colors.restaurant_name),
                    HtmlEscaped(&restaurant.name),
                )?;
                if let Some(slogan) = &restaurant.slogan {
                    write!(
                        f,
                        "<p class=\"slogan\" style=\"{}\">{}</p>",
                        text_style(&typo.restaurant_slogan, &colors.restaurant_name),
                        HtmlEscaped(slogan),
                    )?;
                }
                if header.social_icons.enabled && restaurant.social.iter().next().is_some() {
                    write!(f, "<nav class=\"social icons-{}\">", header.social_icons.icon_pack)?;
                    for (network, url) in restaurant.social.iter() {
                        write!(
                            f,
                            "<a class=\"icon icon-{network}\" href=\"{}\" style=\"color:{}\">{network}</a>",
                            HtmlEscaped(url),
                            CssValue(&colors.restaurant_name),
                        )?;
                    }
                    f.write_str("</nav>")?;
                }
                f.write_str("</div></header>")
            }

            RenderedBlock::AdvertisementHero { ads } => {
                f.write_str("<section class=\"hero\">")?;
                for ad in ads {
                    f.write_str("<figure>")?;
                    if let Some(image) = &ad.image_url {
                        write!(f, "<img src=\"{}\" alt=\"\">", HtmlEscaped(image))?;
                    }
                    write!(
                        f,
                        "<figcaption><span class=\"label\" style=\"{}\">{}</span></figcaption></figure>",
                        label_style(&colors.labels, &colors.buttons),
                        HtmlEscaped(&ad.title),
                    )?;
                }
                f.write_str("</section>")
            }

            RenderedBlock::FeaturedItems { products } => {
                f.write_str("<section class=\"featured\">")?;
                for product in products {
                    write!(f, "<div class=\"card\" style=\"background-color:{}\">", CssValue(&colors.cards))?;
                    self.product(f, product)?;
                    f.write_str("</div>")?;
                }
                f.write_str("</section>")
            }

            RenderedBlock::AdvertisementButton { ad } => {
                let style = label_style(&colors.labels, &colors.buttons);
                match &ad.link_url {
                    Some(link) => write!(
                        f,
                        "<a class=\"ad-button\" href=\"{}\" style=\"{style}\">{}</a>",
                        HtmlEscaped(link),
                        HtmlEscaped(&ad.title),
                    ),
                    None => write!(
                        f,
                        "<div class=\"ad-button\" style=\"{style}\">{}</div>",
                        HtmlEscaped(&ad.title),
                    ),
                }
            }

            RenderedBlock::Categories { sections } => {
                write!(f, "<section class=\"categories layered\" style=\"background-color:{}\">", CssValue(&colors.body))?;
                layers(f, &s.backgrounds.sections.categories, &colors.body)?;
                f.write_str("<div class=\"content\">")?;
                for section in sections {
                    self.category(f, section)?;
                }
                f.write_str("</div></section>")
            }

            RenderedBlock::Footer { restaurant } => {
                write!(f, "<footer class=\"layered\" style=\"background-color:{}\">", CssValue(&colors.header))?;
                f.write_str("<div class=\"content\">")?;
                let style = text_style(&typo.restaurant_slogan, &colors.restaurant_name);
                write!(f, "<p style=\"{style}\">{}</p>", HtmlEscaped(&restaurant.name))?;
                for line in [&restaurant.address, &restaurant.phone].into_iter().flatten() {
                    write!(f, "<p style=\"{style}\">{}</p>", HtmlEscaped(line))?;
                }
                write!(
                    f,
                    "<p style=\"{style}\"><small>{}</small></p></div></footer>",
                    HtmlEscaped(self.options.site_title),
                )
            }
        }
    }

    fn category(&self, f: &mut fmt::Formatter<'_>, section: &CategorySection<'_>) -> fmt::Result {
        let colors = &self.settings.colors;
        write!(
            f,
            "<details class=\"card category\" data-category=\"{}\" style=\"background-color:{}\"{}>",
            section.category.id,
            CssValue(&colors.cards),
            if section.expanded { " open" } else { "" },
        )?;
        write!(
            f,
            "<summary><h2 style=\"{}\">{}</h2></summary>",
            text_style(&self.settings.typography.category_name, &colors.category_name),
            HtmlEscaped(&section.category.name),
        )?;

        f.write_str("<ul class=\"products\">")?;
        for product in &section.products {
            f.write_str("<li>")?;
            self.product(f, product)?;
            f.write_str("</li>")?;
        }
        f.write_str("</ul></details>")
    }

    fn product(&self, f: &mut fmt::Formatter<'_>, product: &Product) -> fmt::Result {
        let colors = &self.settings.colors;
        let typo = &self.settings.typography;

        write!(
            f,
            "<div class=\"product\"><h3 style=\"{}\">{}</h3><span class=\"price\" style=\"{}\">{}</span>",
            text_style(&typo.product_name, &colors.product_name),
            HtmlEscaped(&product.name),
            text_style(&typo.product_price, &colors.product_price),
            HtmlEscaped(&format_price(product.price, self.options.currency_symbol)),
        )?;
        if let Some(description) = &product.description {
            write!(
                f,
                "<p class=\"description\" style=\"{}\">{}</p>",
                text_style(&typo.product_description, &colors.product_description),
                HtmlEscaped(description),
            )?;
        }
        f.write_str("</div>")
    }
}

fn text_style<'a>(style: &'a TextStyle, color: &'a str) -> impl Display + 'a {
    lazy_format!(
        "font-family:'{}',sans-serif;font-size:{};font-weight:{};text-align:{};color:{}",
        CssValue(&style.font_family),
        CssValue(&style.font_size),
        CssValue(&style.font_weight),
        style.alignment,
        CssValue(color),
    )
}

fn label_style<'a>(text: &'a str, background: &'a str) -> impl Display + 'a {
    lazy_format!("color:{};background-color:{}", CssValue(text), CssValue(background))
}

/// Writes the photo and the base color overlay of a layered container. The
/// photo shows with `opacity`, the base color covers the rest. Without a
/// photo, nothing is written and the container's own background shows.
fn layers(f: &mut fmt::Formatter<'_>, background: &Background, base: &str) -> fmt::Result {
    let Some(url) = background.url.as_deref().filter(|url| !url.trim().is_empty()) else {
        return Ok(());
    };

    let opacity = if background.opacity.is_nan() { 1.0 } else { background.opacity.clamp(0.0, 1.0) };
    write!(
        f,
        "<div class=\"bg\" style=\"background-image:url('{}')\"></div>\
            <div class=\"overlay\" style=\"background-color:{};opacity:{}\"></div>",
        CssUrl(url),
        CssValue(base),
        1.0 - opacity,
    )
}


#[cfg(test)]
mod tests {
    use crate::{
        store::{Category, ContentItem, ContentKind, SocialLinks},
        theme::ThemeBlueprint,
    };
    use super::*;


    const OPTIONS: PageOptions<'static> = PageOptions {
        site_title: "Bufibu Menu",
        currency_symbol: "₺",
    };

    fn menu() -> MenuData {
        MenuData {
            restaurant: Restaurant {
                id: 1,
                slug: "kebapci".into(),
                name: "Kebapçı <Usta>".into(),
                slogan: None,
                logo_url: Some("https://cdn.example/logo.png".into()),
                address: Some("İstiklal Cad. 1".into()),
                phone: None,
                social: SocialLinks {
                    instagram: Some("https://instagram.com/kebapci".into()),
                    ..Default::default()
                },
                theme_config: None,
            },
            categories: vec![
                Category {
                    id: 1,
                    restaurant_id: 1,
                    name: "Izgara".into(),
                    description: None,
                    image_url: None,
                    sort_order: 0,
                    is_active: true,
                },
                Category {
                    id: 2,
                    restaurant_id: 1,
                    name: "Tatlı".into(),
                    description: None,
                    image_url: None,
                    sort_order: 1,
                    is_active: true,
                },
            ],
            products: vec![Product {
                id: 10,
                restaurant_id: 1,
                category_id: 1,
                name: "Adana".into(),
                description: Some("Acılı".into()),
                image_url: None,
                price: 320.0,
                sort_order: 0,
                is_featured: false,
                is_active: true,
            }],
            content_items: vec![ContentItem {
                id: 5,
                restaurant_id: 1,
                kind: ContentKind::Advertisement,
                title: "Öğle menüsü".into(),
                image_url: None,
                link_url: Some("/kampanya".into()),
                sort_order: 0,
                is_active: true,
            }],
        }
    }

    #[test]
    fn page_uses_theme() {
        let data = menu();
        let settings = ThemeBlueprint::default_blueprint().advanced_settings;
        let html = menu_page(&settings, &data, &ExpandedCategories::initial(&data.categories), OPTIONS);

        assert!(html.contains("Kebapçı &lt;Usta&gt;"));
        assert!(html.contains("font-family:'Playfair Display',sans-serif;font-size:2.5rem;\
            font-weight:700;text-align:center;color:#ffffff"));
        assert!(html.contains("320.00 ₺"));
        assert!(html.contains("height:80px"));
        assert!(html.contains("icon-instagram"));
        assert!(html.contains("href=\"/kampanya\""));
        assert!(html.contains("data-category=\"1\" style=\"background-color:#ffffff\" open>"));
        assert!(html.contains("data-category=\"2\" style=\"background-color:#ffffff\">"));
        assert!(html.contains("anim-bufibu-klasik"));

        // No featured product, so no featured section.
        assert!(!html.contains("class=\"featured\""));

        let header = html.find("<header").unwrap();
        let categories = html.find("class=\"categories").unwrap();
        let footer = html.find("<footer").unwrap();
        assert!(header < categories && categories < footer);
    }

    #[test]
    fn block_order_follows_layout() {
        let data = menu();
        let mut settings = ThemeBlueprint::default_blueprint().advanced_settings;
        settings.layout.blocks = vec!["footer".into(), "header".into()];
        let html = menu_page(&settings, &data, &ExpandedCategories::default(), OPTIONS);

        assert!(html.find("<footer").unwrap() < html.find("<header").unwrap());
        assert!(!html.contains("class=\"categories"));
    }

    #[test]
    fn hostile_theme_values_are_neutralized() {
        let data = menu();
        let mut settings = ThemeBlueprint::default_blueprint().advanced_settings;
        settings.colors.cards = "#fff\"><script>".into();
        settings.typography.product_name.font_size = "1rem;position:fixed".into();
        settings.backgrounds.global.url = Some("x.jpg') ; background:red".into());

        let html = menu_page(&settings, &data, &ExpandedCategories::default(), OPTIONS);
        assert!(!html.contains("<script>"));
        assert!(!html.contains("position:fixed"));
        assert!(html.contains("url('x.jpg%27%29;background:red')"));
    }

    #[test]
    fn background_overlay() {
        let data = menu();
        let mut settings = ThemeBlueprint::default_blueprint().advanced_settings;
        settings.backgrounds.sections.header = Background {
            url: Some("https://cdn.example/bg.jpg".into()),
            opacity: 0.25,
        };
        settings.backgrounds.global = Background {
            url: Some("https://cdn.example/page.jpg".into()),
            opacity: 7.0,
        };

        let html = menu_page(&settings, &data, &ExpandedCategories::default(), OPTIONS);
        assert!(html.contains("url('https://cdn.example/bg.jpg')"));
        assert!(html.contains("background-color:#1f1a17;opacity:0.75"));
        assert!(html.contains("background-color:#f7f3ee;opacity:0\""));
    }

    #[test]
    fn error_page_escapes() {
        let html = error_page("Not found", "No menu for '<x>'", OPTIONS);
        assert!(html.contains("<h1>Not found</h1>"));
        assert!(html.contains("No menu for &#39;&lt;x&gt;&#39;"));
    }

    #[test]
    fn prices() {
        assert_eq!(format_price(12.5, "₺"), "12.50 ₺");
        assert_eq!(format_price(0.0, "€"), "0.00 €");
    }
}
