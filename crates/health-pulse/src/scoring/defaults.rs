use super::domain::Metric;

/// Reference catalogue shipped with the settings screen; enabled weights total 100.
pub fn reference_metrics() -> Vec<Metric> {
    vec![
        Metric::new(
            "product_usage",
            "Product Usage",
            "Active users and session depth across the account",
            25,
        ),
        Metric::new(
            "support_tickets",
            "Support Tickets",
            "Volume and severity of open support cases",
            20,
        ),
        Metric::new(
            "nps",
            "NPS Score",
            "Latest net promoter survey results",
            20,
        ),
        Metric::new(
            "engagement",
            "Engagement",
            "Meeting cadence and stakeholder responsiveness",
            15,
        ),
        Metric::new(
            "adoption",
            "Feature Adoption",
            "Share of licensed features in regular use",
            10,
        ),
        Metric::new(
            "billing",
            "Billing Health",
            "Payment timeliness and outstanding invoices",
            10,
        ),
    ]
}
