//! Book instance flows. Instances have no dependents, so they are always
//! deletable.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use super::{
  Catalog, CatalogError, CatalogResult, DeletePrompt, Form, FormPage, in_field_order,
};
use crate::{
  derived::{self, BookView, InstanceView},
  integrity::Dependents,
  model::{EntityKind, InstanceFields},
  store::{BookFilter, CatalogStore, InstanceFilter},
  validate::{self, InstanceForm, Invalid, Violation},
};

const KIND: EntityKind = EntityKind::BookInstance;

/// A row of the instance list: the copy with its book resolved.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceListItem {
  pub instance: InstanceView,
  pub book:     Option<BookView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstanceDetail {
  pub instance: InstanceView,
  pub book:     Option<BookView>,
}

impl<S: CatalogStore> Catalog<S> {
  pub async fn list_instances(&self) -> CatalogResult<Vec<InstanceListItem>, S> {
    let instances = self
      .store
      .find_instances(InstanceFilter::default())
      .await
      .map_err(CatalogError::Store)?;
    let books: HashMap<Uuid, BookView> = self
      .store
      .find_books(BookFilter::default())
      .await
      .map_err(CatalogError::Store)?
      .into_iter()
      .map(|b| (b.id, BookView::from(b)))
      .collect();

    Ok(
      instances
        .into_iter()
        .map(|instance| InstanceListItem {
          book:     books.get(&instance.book).cloned(),
          instance: instance.into(),
        })
        .collect(),
    )
  }

  pub async fn instance_detail(&self, id: Uuid) -> CatalogResult<InstanceDetail, S> {
    let instance = self
      .store
      .get_instance(id)
      .await
      .map_err(CatalogError::Store)?
      .ok_or(CatalogError::NotFound { kind: KIND, id })?;

    let book = self
      .store
      .get_book(instance.book)
      .await
      .map_err(CatalogError::Store)?
      .map(BookView::from);

    Ok(InstanceDetail { instance: instance.into(), book })
  }

  pub async fn instance_create_form(&self) -> CatalogResult<FormPage<InstanceForm>, S> {
    Ok(FormPage {
      id:      None,
      form:    InstanceForm::default(),
      choices: self.choices(KIND).await?,
    })
  }

  pub async fn create_instance(&self, form: &InstanceForm) -> CatalogResult<String, S> {
    let fields = self.validated_instance(form).await?;
    let instance = self
      .store
      .create_instance(fields)
      .await
      .map_err(CatalogError::Store)?;
    tracing::info!(
      instance_id = %instance.id,
      book_id = %instance.book,
      status = %instance.status,
      "book instance created"
    );
    Ok(derived::url(KIND, instance.id))
  }

  pub async fn instance_update_form(
    &self,
    id: Uuid,
  ) -> CatalogResult<FormPage<InstanceForm>, S> {
    let instance = self
      .store
      .get_instance(id)
      .await
      .map_err(CatalogError::Store)?
      .ok_or(CatalogError::NotFound { kind: KIND, id })?;

    Ok(FormPage {
      id:      Some(id),
      form:    InstanceForm::from(&instance),
      choices: self.choices(KIND).await?,
    })
  }

  pub async fn update_instance(
    &self,
    id: Uuid,
    form: &InstanceForm,
  ) -> CatalogResult<String, S> {
    let fields = self.validated_instance(form).await?;
    let instance = self
      .store
      .update_instance(id, fields)
      .await
      .map_err(CatalogError::Store)?
      .ok_or(CatalogError::NotFound { kind: KIND, id })?;
    tracing::info!(
      instance_id = %instance.id,
      status = %instance.status,
      "book instance updated"
    );
    Ok(derived::url(KIND, instance.id))
  }

  pub async fn instance_delete_form(
    &self,
    id: Uuid,
  ) -> CatalogResult<Option<DeletePrompt<InstanceView>>, S> {
    let instance = self.store.get_instance(id).await.map_err(CatalogError::Store)?;
    Ok(instance.map(|instance| DeletePrompt {
      record:     instance.into(),
      dependents: Dependents::None,
    }))
  }

  pub async fn delete_instance(&self, id: Uuid) -> CatalogResult<String, S> {
    if self.store.delete_instance(id).await.map_err(CatalogError::Store)? {
      tracing::info!(instance_id = %id, "book instance deleted");
    }
    Ok(derived::list_url(KIND))
  }

  // ── Helpers ───────────────────────────────────────────────────────────

  /// Validate the form and check that its book exists, collecting both kinds
  /// of violation in one rejection.
  async fn validated_instance(&self, form: &InstanceForm) -> CatalogResult<InstanceFields, S> {
    let (fields, form, mut violations) = match validate::validate_instance(form) {
      Ok(fields) => {
        let form = echo(&fields);
        (Some(fields), form, Vec::new())
      }
      Err(invalid) => (None, invalid.form, invalid.violations),
    };

    if let Ok(book) = Uuid::parse_str(&form.book)
      && self
        .store
        .get_book(book)
        .await
        .map_err(CatalogError::Store)?
        .is_none()
    {
      violations.push(Violation {
        field:   "book",
        message: "Book not found.".to_owned(),
      });
    }

    match fields {
      Some(fields) if violations.is_empty() => Ok(fields),
      _ => {
        in_field_order(&mut violations, &["book", "imprint", "status", "due_back"]);
        let invalid = Invalid { form, violations };
        Err(self.reject(KIND, invalid, Form::Instance).await)
      }
    }
  }
}

/// The sanitized form corresponding to already-validated fields.
fn echo(fields: &InstanceFields) -> InstanceForm {
  InstanceForm {
    book:     fields.book.to_string(),
    imprint:  fields.imprint.clone(),
    status:   fields.status.as_str().to_owned(),
    due_back: derived::date_picker_value(fields.due_back).unwrap_or_default(),
  }
}
