// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::QuoteRepository,
    models::quotes::Quote,
};

#[derive(Clone)]
pub struct DocumentService {
    quote_repo: QuoteRepository,
}

impl DocumentService {
    pub fn new(quote_repo: QuoteRepository) -> Self {
        Self { quote_repo }
    }

    /// Gera o PDF do orçamento em memória. Os totais impressos são os
    /// gravados, que já nasceram da função única de cálculo.
    pub async fn generate_quote_pdf(&self, quote_id: Uuid) -> Result<Vec<u8>, AppError> {
        let quote = self
            .quote_repo
            .find_by_id(quote_id)
            .await?
            .ok_or(AppError::NotFound("Orçamento"))?;

        self.render_quote(&quote)
    }

    fn render_quote(&self, quote: &Quote) -> Result<Vec<u8>, AppError> {
        // Carrega a fonte da pasta 'fonts/'
        let font_family = genpdf::fonts::from_files("./fonts", "Roboto", None)
            .map_err(|_| AppError::FontNotFound("Fonte não encontrada na pasta ./fonts".to_string()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Orçamento {}", quote.quote_number));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new("ORÇAMENTO")
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(
            elements::Paragraph::new(format!("Nº {}", quote.quote_number))
                .styled(style::Style::new().with_font_size(12)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Data: {}",
            quote.created_at.format("%d/%m/%Y")
        )));

        if let Some(valid_until) = quote.valid_until {
            doc.push(elements::Paragraph::new(format!(
                "Válido até: {}",
                valid_until.format("%d/%m/%Y")
            )));
        }

        doc.push(elements::Break::new(1.5));

        // --- CLIENTE ---
        doc.push(
            elements::Paragraph::new(quote.title.clone())
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Paragraph::new(format!("Cliente: {}", quote.client_name)));
        if let Some(email) = &quote.client_email {
            doc.push(elements::Paragraph::new(format!("E-mail: {}", email)));
        }
        if let Some(phone) = &quote.client_phone {
            doc.push(elements::Paragraph::new(format!("Telefone: {}", phone)));
        }

        doc.push(elements::Break::new(2));

        // --- TABELA DE ITENS ---
        // Pesos das colunas: Descrição (4), Qtd (1), Preço (2), Total (2)
        let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Descrição").styled(style_bold))
            .element(elements::Paragraph::new("Qtd").styled(style_bold))
            .element(elements::Paragraph::new("Unitário").styled(style_bold))
            .element(elements::Paragraph::new("Total").styled(style_bold))
            .push()
            .map_err(|e| AppError::PdfError(e.to_string()))?;

        for item in quote.items.iter() {
            let line_total = item.quantity * item.unit_price;
            table
                .row()
                .element(elements::Paragraph::new(item.description.clone()))
                .element(elements::Paragraph::new(format!("{:.2}", item.quantity)))
                .element(elements::Paragraph::new(format!("R$ {:.2}", item.unit_price)))
                .element(elements::Paragraph::new(format!("R$ {:.2}", line_total)))
                .push()
                .map_err(|e| AppError::PdfError(e.to_string()))?;
        }

        doc.push(table);
        doc.push(elements::Break::new(1.5));

        // --- TOTAIS ---
        doc.push(elements::Paragraph::new(format!(
            "Subtotal: R$ {:.2}",
            quote.subtotal
        )));
        doc.push(elements::Paragraph::new(format!(
            "Desconto ({}%): -R$ {:.2}",
            quote.discount, quote.discount_amount
        )));
        doc.push(elements::Paragraph::new(format!(
            "Imposto ({}%): +R$ {:.2}",
            quote.tax, quote.tax_amount
        )));

        let mut total_paragraph =
            elements::Paragraph::new(format!("TOTAL: R$ {:.2}", quote.total));
        total_paragraph.set_alignment(genpdf::Alignment::Right);
        doc.push(total_paragraph.styled(style::Style::new().bold().with_font_size(12)));

        doc.push(elements::Break::new(2));

        // --- QR CODE (conferência do número na recepção) ---
        let code = QrCode::new(quote.quote_number.as_bytes())
            .map_err(|e| AppError::PdfError(e.to_string()))?;

        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

        let pdf_image = genpdf::elements::Image::from_dynamic_image(dynamic_image)
            .map_err(|e| AppError::PdfError(e.to_string()))?
            .with_scale(genpdf::Scale::new(0.5, 0.5));

        doc.push(pdf_image);

        // --- CONDIÇÕES ---
        if let Some(terms) = &quote.terms {
            doc.push(elements::Break::new(1.5));
            doc.push(
                elements::Paragraph::new("Condições")
                    .styled(style::Style::new().bold().with_font_size(10)),
            );
            doc.push(
                elements::Paragraph::new(terms.clone())
                    .styled(style::Style::new().with_font_size(9)),
            );
        }

        if let Some(notes) = &quote.notes {
            doc.push(elements::Break::new(1));
            doc.push(
                elements::Paragraph::new(notes.clone())
                    .styled(style::Style::new().italic().with_font_size(8)),
            );
        }

        // Renderiza para Buffer (Memória)
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::PdfError(e.to_string()))?;

        Ok(buffer)
    }
}
