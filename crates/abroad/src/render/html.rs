//! HTML markup for the browse views.
//!
//! All stored text is escaped. The detail block of each study card is
//! emitted with the `hidden` attribute next to a "Show More" button; the
//! hosting page toggles it.

use std::fmt::{self, Display, Formatter};

use super::{
    CourseView, FinancingView, HousingView, InternshipCard, InternshipListing, RatingView,
    StudyCard, StudyDetails, StudyListing, VisaView,
};
use crate::record::Vaccination;

const NOT_AVAILABLE: &str = "N/A";

/// Displays a view as HTML.
#[derive(Debug, Clone, Copy)]
pub struct Html<'a, T>(pub &'a T);

/// Text with `& < > " '` replaced by entities.
#[derive(Debug, Clone, Copy)]
pub struct Escaped<'a>(pub &'a str);

impl Display for Escaped<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut rest = self.0;
        while let Some(pos) = rest.find(['&', '<', '>', '"', '\'']) {
            f.write_str(&rest[..pos])?;
            let entity = match rest.as_bytes()[pos] {
                b'&' => "&amp;",
                b'<' => "&lt;",
                b'>' => "&gt;",
                b'"' => "&quot;",
                _ => "&#39;",
            };
            f.write_str(entity)?;
            rest = &rest[pos + 1..];
        }
        f.write_str(rest)
    }
}

fn or_na(value: Option<&String>) -> Escaped<'_> {
    Escaped(value.map_or(NOT_AVAILABLE, String::as_str))
}

fn link(f: &mut Formatter<'_>, href: &str) -> fmt::Result {
    write!(
        f,
        r#"<a href="{}" target="_blank">{}</a>"#,
        Escaped(href),
        Escaped(href)
    )
}

fn paragraph(f: &mut Formatter<'_>, label: &str, value: Option<&String>) -> fmt::Result {
    if let Some(value) = value {
        writeln!(f, "<p><strong>{label}:</strong> {}</p>", Escaped(value))?;
    }
    Ok(())
}

fn meta(f: &mut Formatter<'_>, label: &str, value: Option<&String>) -> fmt::Result {
    if let Some(value) = value {
        writeln!(f, "<span><strong>{label}:</strong> {}</span>", Escaped(value))?;
    }
    Ok(())
}

fn notice(f: &mut Formatter<'_>, message: &str) -> fmt::Result {
    writeln!(f, r#"<div class="no-results">{}</div>"#, Escaped(message))
}

impl Display for Html<'_, RatingView> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rating = self.0;
        write!(f, r#"<span class="rating">{}"#, rating.glyphs)?;
        if let Some(value) = rating.value.filter(|_| rating.is_rated()) {
            write!(f, " ({value}/5)")?;
        }
        if let Some(label) = rating.label {
            write!(f, " - {}", Escaped(label))?;
        }
        f.write_str("</span>")
    }
}

impl Display for Html<'_, CourseView> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let course = self.0;
        writeln!(f, r#"<div class="course">"#)?;
        writeln!(f, "<strong>{}</strong><br>", Escaped(&course.title))?;
        f.write_str("<strong>Difficulty:</strong> ")?;
        if let Some(marker) = course.difficulty.marker {
            write!(f, "{marker} ")?;
        }
        writeln!(f, "{}<br>", Html(&course.difficulty))?;
        write!(
            f,
            "Responsible Person: {}",
            or_na(course.responsible_person.as_ref())
        )?;
        if let Some(email) = &course.email {
            write!(
                f,
                r#" (<a href="mailto:{}">{}</a>)"#,
                Escaped(email),
                Escaped(email)
            )?;
        }
        writeln!(f, "<br>")?;
        writeln!(f, "Exam Type: {}<br>", or_na(course.exam_type.as_ref()))?;
        if let Some(ects) = &course.ects {
            writeln!(f, "ECTS: {}<br>", Escaped(ects))?;
        }
        if let Some(href) = &course.link {
            f.write_str("Link: ")?;
            link(f, href)?;
            writeln!(f, "<br>")?;
        }
        writeln!(f, "Description: {}", or_na(course.description.as_ref()))?;
        writeln!(f, "</div>")
    }
}

impl Display for Html<'_, FinancingView> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"<div class="finances"><strong>Finances:</strong>"#)?;
        paragraph(f, "Financing", self.0.methods.as_ref())?;
        paragraph(f, "Financing Aid Amount", self.0.aid_amount.as_ref())?;
        writeln!(f, "</div>")
    }
}

impl Display for Html<'_, HousingView> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let housing = self.0;
        writeln!(f, r#"<div class="housing"><strong>Housing:</strong>"#)?;
        writeln!(
            f,
            "<strong>Housing Quality:</strong> {}<br>",
            Html(&housing.quality)
        )?;
        writeln!(
            f,
            "<strong>Type:</strong> {}<br>",
            Escaped(&housing.housing_type)
        )?;
        writeln!(f, "<strong>Costs:</strong> {}<br>", or_na(housing.cost.as_ref()))?;
        if let Some(href) = &housing.link {
            f.write_str("Link: ")?;
            link(f, href)?;
            writeln!(f, "<br>")?;
        }
        writeln!(f, "Comments: {}", or_na(housing.comments.as_ref()))?;
        writeln!(f, "</div>")
    }
}

impl Display for Html<'_, VisaView> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let visa = self.0;
        writeln!(f, r#"<div class="visa"><strong>Visa:</strong>"#)?;
        writeln!(f, "<strong>Visa Required</strong><br>")?;
        match &visa.cost {
            Some(cost) => writeln!(f, "Cost: €{}<br>", Escaped(cost))?,
            None => writeln!(f, "Cost: {NOT_AVAILABLE}<br>")?,
        }
        write!(f, "Embassy: {}", or_na(visa.embassy.as_ref()))?;
        if let Some(location) = &visa.embassy_location {
            write!(f, " ({})", Escaped(location))?;
        }
        writeln!(f, "<br>")?;
        writeln!(
            f,
            "Application Time: {}<br>",
            or_na(visa.application_time.as_ref())
        )?;
        if let Some(href) = &visa.website {
            f.write_str("Website: ")?;
            link(f, href)?;
            writeln!(f, "<br>")?;
        }
        writeln!(f, "Email: {}<br>", or_na(visa.email.as_ref()))?;
        if let Some(phone) = &visa.phone {
            writeln!(f, "Phone: {}<br>", Escaped(phone))?;
        }
        writeln!(f, "Comments: {}", or_na(visa.comments.as_ref()))?;
        writeln!(f, "</div>")
    }
}

impl Display for Html<'_, Vaccination> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let vaccination = self.0;
        writeln!(f, r#"<div class="vaccination">"#)?;
        writeln!(f, "<strong>{}</strong><br>", Escaped(&vaccination.which))?;
        match vaccination.cost.as_ref().filter(|c| !c.is_empty()) {
            Some(cost) => writeln!(f, "Costs: €{}<br>", Escaped(cost))?,
            None => writeln!(f, "Costs: {NOT_AVAILABLE}<br>")?,
        }
        let comments = vaccination.comments.as_ref().filter(|c| !c.is_empty());
        writeln!(f, "Comments: {}", or_na(comments))?;
        writeln!(f, "</div>")
    }
}

impl Display for Html<'_, StudyDetails> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let details = self.0;
        writeln!(f, r#"<button class="show-more-btn">Show More</button>"#)?;
        writeln!(f, r#"<div class="collapsible-details" hidden>"#)?;
        if let Some(financing) = &details.financing {
            write!(f, "{}", Html(financing))?;
        }
        if let Some(housing) = &details.housing {
            write!(f, "{}", Html(housing))?;
        }
        if let Some(visa) = &details.visa {
            write!(f, "{}", Html(visa))?;
        }
        if !details.vaccinations.is_empty() {
            writeln!(
                f,
                r#"<div class="vaccinations"><strong>Vaccinations:</strong>"#
            )?;
            for vaccination in &details.vaccinations {
                write!(f, "{}", Html(vaccination))?;
            }
            writeln!(f, "</div>")?;
        }
        paragraph(f, "Tips", details.application_tips.as_ref())?;
        paragraph(f, "Comments", details.general_comments.as_ref())?;
        writeln!(f, "</div>")
    }
}

impl Display for Html<'_, StudyCard> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let card = self.0;
        let summary = &card.summary;

        writeln!(f, r#"<div class="experience-card">"#)?;
        if let Some(id) = card.id {
            writeln!(f, r#"<button class="btn edit-btn" data-id="{id}">Edit</button>"#)?;
        }
        writeln!(f, "<h3>{}</h3>", Escaped(&summary.title))?;
        writeln!(f, r#"<div class="experience-meta">"#)?;
        write!(
            f,
            r#"<span><strong>Contact:</strong> {} (<a href="mailto:{}">{}</a>"#,
            Escaped(&summary.contact_name),
            Escaped(&summary.contact_email),
            Escaped(&summary.contact_email)
        )?;
        if let Some(phone) = &summary.contact_phone {
            write!(
                f,
                r#", <a href="tel:{}">{}</a>"#,
                Escaped(phone),
                Escaped(phone)
            )?;
        }
        writeln!(f, ")</span>")?;
        writeln!(
            f,
            "<span><strong>Study Class:</strong> {}</span>",
            Escaped(&summary.class_year)
        )?;
        writeln!(
            f,
            "<span><strong>Duration:</strong> {}</span>",
            Escaped(&summary.duration)
        )?;
        meta(f, "Tuition", summary.tuition.as_ref())?;
        for (label, href) in [
            ("Website", &summary.website),
            ("Department Website", &summary.department_website),
        ] {
            if let Some(href) = href {
                write!(f, "<span><strong>{label}:</strong> ")?;
                link(f, href)?;
                writeln!(f, "</span>")?;
            }
        }
        writeln!(f, "</div>")?;

        if !summary.courses.is_empty() {
            writeln!(f, r#"<div class="courses"><strong>Courses:</strong>"#)?;
            for course in &summary.courses {
                write!(f, "{}", Html(course))?;
            }
            writeln!(f, "</div>")?;
        }

        write!(f, "{}", Html(&card.details))?;
        writeln!(f, "</div>")
    }
}

impl Display for Html<'_, StudyListing> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let listing = self.0;
        if let Some(summary) = &listing.summary {
            writeln!(f, r#"<div class="filter-summary">{}</div>"#, Escaped(summary))?;
        }
        if let Some(message) = listing.notice {
            return notice(f, message);
        }
        for (i, group) in listing.groups.iter().enumerate() {
            if i > 0 {
                writeln!(f, r#"<hr class="country-separator">"#)?;
            }
            writeln!(
                f,
                r#"<h2 class="country-heading">{}</h2>"#,
                Escaped(&group.country)
            )?;
            for card in &group.cards {
                write!(f, "{}", Html(card))?;
            }
        }
        Ok(())
    }
}

impl Display for Html<'_, InternshipCard> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let card = self.0;
        writeln!(f, r#"<div class="experience-card">"#)?;
        writeln!(f, "<h3>{}</h3>", Escaped(&card.title))?;
        writeln!(f, r#"<div class="experience-meta">"#)?;
        writeln!(
            f,
            "<span><strong>Contact:</strong> {} ({})</span>",
            Escaped(&card.contact_name),
            Escaped(&card.contact_email)
        )?;
        writeln!(
            f,
            "<span><strong>Duration:</strong> {}</span>",
            Escaped(&card.duration)
        )?;
        if let Some(stipend) = &card.stipend {
            writeln!(
                f,
                "<span><strong>Stipend:</strong> €{}/month</span>",
                Escaped(stipend)
            )?;
        }
        writeln!(
            f,
            "<span><strong>Experience:</strong> {}</span>",
            Html(&card.experience)
        )?;
        meta(f, "Submitted", card.submitted.as_ref())?;
        writeln!(f, "</div>")?;
        paragraph(f, "Work", card.work_description.as_ref())?;
        paragraph(f, "Skills Learned", card.skills_learned.as_ref())?;
        paragraph(f, "Financing", card.financing_methods.as_ref())?;
        paragraph(f, "Tips", card.application_tips.as_ref())?;
        paragraph(f, "Comments", card.general_comments.as_ref())?;
        writeln!(f, "</div>")
    }
}

impl Display for Html<'_, InternshipListing> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let listing = self.0;
        if let Some(message) = listing.notice {
            return notice(f, message);
        }
        for card in &listing.cards {
            write!(f, "{}", Html(card))?;
        }
        Ok(())
    }
}
