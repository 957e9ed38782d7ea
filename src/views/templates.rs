use handlebars::{Handlebars, TemplateError};
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

const TEMPLATES: &[(&str, &str)] = &[
    ("layouts/base", include_str!("../../templates/layouts/base.hbs")),
    ("pages/home", include_str!("../../templates/pages/home.hbs")),
    ("pages/not_found", include_str!("../../templates/pages/not_found.hbs")),
    ("pages/login", include_str!("../../templates/pages/login.hbs")),
    ("pages/register", include_str!("../../templates/pages/register.hbs")),
    ("pages/products", include_str!("../../templates/pages/products.hbs")),
    ("pages/statistics", include_str!("../../templates/pages/statistics.hbs")),
    ("orders/create", include_str!("../../templates/orders/create.hbs")),
    ("orders/index", include_str!("../../templates/orders/index.hbs")),
    ("orders/my_orders", include_str!("../../templates/orders/my_orders.hbs")),
    ("orders/edit", include_str!("../../templates/orders/edit.hbs")),
    ("orders/delete", include_str!("../../templates/orders/delete.hbs")),
    ("orders/denied", include_str!("../../templates/orders/denied.hbs")),
    ("orders/success", include_str!("../../templates/orders/success.hbs")),
];

const PARTIALS: &[(&str, &str)] = &[
    ("navbar", include_str!("../../templates/partials/navbar.hbs")),
    ("footer", include_str!("../../templates/partials/footer.hbs")),
    ("order_rows", include_str!("../../templates/partials/order_rows.hbs")),
];

pub fn build_handlebars() -> Result<Hbs, TemplateError> {
    let mut hb = Handlebars::new();

    for (name, source) in TEMPLATES {
        hb.register_template_string(name, *source)?;
    }
    for (name, source) in PARTIALS {
        hb.register_partial(name, *source)?;
    }

    Ok(Arc::new(hb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_templates_compile() {
        let hb = build_handlebars().expect("templates compile");
        assert!(hb.has_template("layouts/base"));
        assert!(hb.has_template("orders/edit"));
    }
}
