//! Plain-text rendering for terminal output.

use crate::clients::CenterSearch;
use ecosort_core::education::EducationContent;
use ecosort_core::impact::CountUpFrame;
use ecosort_core::{Classification, ImpactReport};
use std::fmt::Write;

pub fn classification(c: &Classification) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", c.summary());
    let _ = writeln!(out, "Item: {}", c.item);

    if !c.materials.is_empty() {
        let _ = writeln!(out, "Materials: {}", c.materials.join(", "));
    }

    let _ = writeln!(out, "\nRecycling guidance:\n  {}", c.recycling_guidance);

    if c.is_hazardous() {
        out.push_str("\nHazards:\n");
        for hazard in &c.hazards {
            let _ = writeln!(out, "  ! {hazard}");
        }
    }

    if !c.disposal_steps.is_empty() {
        out.push_str("\nDisposal steps:\n");
        for (i, step) in c.disposal_steps.iter().enumerate() {
            let _ = writeln!(out, "  {}. {step}", i + 1);
        }
    }
    out
}

pub fn centers(search: &CenterSearch) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Near {} ({}), within {:.1} km:",
        search.origin.display_name,
        search.origin.coordinates,
        f64::from(search.radius_m) / 1000.0
    );

    if search.centers.is_empty() {
        out.push_str("No recycling centers found nearby. Try a different location.\n");
        return out;
    }

    for (i, center) in search.centers.iter().enumerate() {
        let _ = writeln!(out, "\n{}. {} ({})", i + 1, center.name, center.distance);
        let _ = writeln!(out, "   {}", center.address);
        if !center.accepted_items.is_empty() {
            let _ = writeln!(out, "   Accepts: {}", center.accepted_items.join(", "));
        }
        if let Some(hours) = &center.hours {
            let _ = writeln!(out, "   Hours: {hours}");
        }
        if let Some(phone) = &center.phone {
            let _ = writeln!(out, "   Phone: {phone}");
        }
        if let Some(website) = &center.website {
            let _ = writeln!(out, "   Web: {website}");
        }
        let _ = writeln!(out, "   Directions: {}", center.directions_url);
    }
    out
}

/// The four headline figures on one line, used by the count-up animation.
pub fn count_up_frame(frame: &CountUpFrame) -> String {
    format!(
        "CO₂ {:.1} kg | Energy {:.1} kWh | Water {:.0} L | Trees {:.1}",
        frame.co2_kg, frame.energy_kwh, frame.water_l, frame.trees
    )
}

pub fn impact(report: &ImpactReport) -> String {
    let stats = &report.stats;
    let eq = &report.equivalents;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Level {} | {} items recycled | {} more to level {} ({}%)",
        stats.level,
        stats.items_recycled,
        stats.next_level_items,
        stats.level + 1,
        stats.level_progress
    );
    let _ = writeln!(
        out,
        "\n  CO₂ saved     {:>8.1} kg   ≈ {:.1} trees planted",
        stats.co2_saved_kg, eq.trees_planted
    );
    let _ = writeln!(
        out,
        "  Energy saved  {:>8.1} kWh  ≈ {:.1} days of home power",
        stats.energy_saved_kwh, eq.home_days_powered
    );
    let _ = writeln!(
        out,
        "  Water saved   {:>8.0} L    ≈ {:.0} days of drinking water",
        stats.water_saved_l, eq.people_days_of_water
    );
    let _ = writeln!(out, "  Trees saved   {:>8.1}", stats.trees_saved);

    if !report.by_category.is_empty() {
        out.push_str("\nBy category:\n");
        for (category, count) in &report.by_category {
            let _ = writeln!(out, "  {category:<18} {count}");
        }
    }

    out.push_str("\nAchievements:\n");
    for a in &report.achievements {
        let mark = if a.unlocked { "[x]" } else { "[ ]" };
        let _ = writeln!(out, "  {mark} {} - {}", a.name, a.description);
    }
    out
}

pub fn education(content: &EducationContent) -> String {
    let mut out = String::new();

    out.push_str("E-waste types\n");
    for t in content.ewaste_types {
        let _ = writeln!(out, "\n  {}\n  {}", t.title, t.description);
        for fact in t.facts {
            let _ = writeln!(out, "    - {fact}");
        }
        let _ = writeln!(out, "    Tip: {}", t.recycling_tip);
    }

    out.push_str("\nGlobal impact\n");
    for s in content.global_impact {
        let _ = writeln!(out, "  {:>8}  {}", s.stat, s.label);
    }

    out.push_str("\nDid you know?\n");
    for fact in content.did_you_know {
        let _ = writeln!(out, "  * {fact}");
    }

    out.push_str("\nFAQ\n");
    for entry in content.faq {
        let _ = writeln!(out, "\n  Q: {}\n  A: {}", entry.question, entry.answer);
    }

    out.push_str("\nQuick start\n");
    for (i, step) in content.quick_start.iter().enumerate() {
        let _ = writeln!(out, "  {}. {} - {}", i + 1, step.title, step.description);
    }
    out
}
