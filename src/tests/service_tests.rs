//! tests/service_tests.rs
//! Pruebas de los servicios del servidor contra SQLite en memoria.

#[cfg(test)]
mod tests {
    use actix_rt::test;

    use crate::models::checklist_model::{ChecklistItemRequest, ChecklistResponseInput};
    use crate::models::equipment_model::{ConflictSeverity, ConflictTiming};
    use crate::models::maintenance_model::{
        AdminNotesRequest, CancelRequest, CompleteRequest, CreateMaintenanceRequest,
        MaintenanceKind, MaintenanceRecord, MaintenanceStatus,
    };
    use crate::models::signature_model::{SignatureRequest, SignatureRole};
    use crate::services::errors::ServiceError;
    use crate::services::equipment_service::EquipmentService;
    use crate::services::maintenance_service::MaintenanceService;
    use crate::services::signature_service::SignatureService;
    use crate::tests::support::{date, memory_pool, services, Services, SIGNATURE_IMAGE};

    const TODAY: &str = "2025-03-10";

    async fn create(s: &Services, scheduled: &str) -> MaintenanceRecord {
        s.maintenance
            .create_record(
                CreateMaintenanceRequest {
                    equipment_id: "eq-1".to_string(),
                    template_id: "tpl-1".to_string(),
                    scheduled_date: date(scheduled),
                    kind: MaintenanceKind::Preventivo,
                    notes: None,
                },
                date(TODAY),
            )
            .await
            .expect("Fallo al crear la orden")
            .record
    }

    fn sign_request(record_id: &str, role: SignatureRole) -> SignatureRequest {
        SignatureRequest {
            record_id: record_id.to_string(),
            role,
            signer_name: format!("Firmante {}", role),
            id_number: None,
            title: Some("Ingeniero clínico".to_string()),
            image: SIGNATURE_IMAGE.to_string(),
            signature_id: None,
        }
    }

    fn item_request(record_id: &str, item_id: &str, done: bool) -> ChecklistItemRequest {
        ChecklistItemRequest {
            record_id: record_id.to_string(),
            item_id: item_id.to_string(),
            is_completed: done,
            comment: None,
            is_admin_edit: None,
            admin_name: None,
        }
    }

    /// Orden con ambas firmas y un ítem marcado, lista para completar.
    async fn ready_to_complete(s: &Services) -> MaintenanceRecord {
        let record = create(s, TODAY).await;
        s.signatures
            .create(sign_request(&record.id, SignatureRole::Tecnico))
            .await
            .unwrap();
        s.signatures
            .create(sign_request(&record.id, SignatureRole::Responsable))
            .await
            .unwrap();
        s.checklist
            .save_item(item_request(&record.id, "item-1", true))
            .await
            .unwrap()
    }

    #[test]
    async fn test_initial_status_depends_on_date() {
        let s = services().await;

        let today = create(&s, TODAY).await;
        assert_eq!(today.status, MaintenanceStatus::Pendiente);
        assert_eq!(today.version, 0);

        let s = services().await;
        let future = create(&s, "2025-04-15").await;
        assert_eq!(future.status, MaintenanceStatus::Programada);
    }

    #[test]
    async fn test_create_reports_conflict_without_blocking() {
        let s = services().await;
        let first = create(&s, TODAY).await;

        let resp = s
            .maintenance
            .create_record(
                CreateMaintenanceRequest {
                    equipment_id: "eq-1".to_string(),
                    template_id: "tpl-1".to_string(),
                    scheduled_date: date("2025-09-01"),
                    kind: MaintenanceKind::Correctivo,
                    notes: Some("Falla de batería".to_string()),
                },
                date(TODAY),
            )
            .await
            .unwrap();

        let conflict = resp.conflict.expect("debe informar conflicto");
        assert_eq!(conflict.severity, ConflictSeverity::Blocking);
        assert_eq!(conflict.timing, ConflictTiming::Pending);
        assert_eq!(conflict.record_id, first.id);
        assert_eq!(resp.record.status, MaintenanceStatus::Programada);

        let history = s.equipment.history("eq-1").await.unwrap();
        assert_eq!(history.history.len(), 2);
        // del más reciente al más antiguo
        assert_eq!(history.history[0].record_id, resp.record.id);
        assert_eq!(history.operating_status, "OPERATIVO");
    }

    #[test]
    async fn test_scheduled_record_blocks_second_order() {
        let s = services().await;
        let scheduled = create(&s, "2025-06-01").await;
        assert_eq!(scheduled.status, MaintenanceStatus::Programada);

        let resp = s
            .maintenance
            .create_record(
                CreateMaintenanceRequest {
                    equipment_id: "eq-1".to_string(),
                    template_id: "tpl-1".to_string(),
                    scheduled_date: date(TODAY),
                    kind: MaintenanceKind::Correctivo,
                    notes: None,
                },
                date(TODAY),
            )
            .await
            .unwrap();

        let conflict = resp.conflict.expect("la orden programada debe informarse");
        assert_eq!(conflict.severity, ConflictSeverity::Blocking);
        assert_eq!(conflict.timing, ConflictTiming::Pending);
        assert_eq!(conflict.record_id, scheduled.id);
        assert_eq!(conflict.status, MaintenanceStatus::Programada);
    }

    #[test]
    async fn test_unknown_references_are_not_found() {
        let s = services().await;

        let err = s
            .maintenance
            .create_record(
                CreateMaintenanceRequest {
                    equipment_id: "eq-1".to_string(),
                    template_id: "tpl-x".to_string(),
                    scheduled_date: date(TODAY),
                    kind: MaintenanceKind::Preventivo,
                    notes: None,
                },
                date(TODAY),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        assert!(matches!(
            s.equipment.history("eq-x").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            s.completion.get_detail("no-existe").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    async fn test_detail_lists_template_items_in_order() {
        let s = services().await;
        let record = create(&s, TODAY).await;
        s.checklist
            .save_item(item_request(&record.id, "item-2", true))
            .await
            .unwrap();

        let detail = s.completion.get_detail(&record.id).await.unwrap();

        let ids: Vec<_> = detail.checklist.iter().map(|e| e.item.id.as_str()).collect();
        assert_eq!(ids, vec!["item-1", "item-2", "item-3"]);
        assert!(detail.checklist[0].response.is_none());
        assert_eq!(
            detail.checklist[1].response.as_ref().map(|r| r.is_completed),
            Some(true)
        );
        assert!(detail.signatures.is_empty());
    }

    #[test]
    async fn test_checklist_upsert_bumps_version_and_keeps_comment() {
        let s = services().await;
        let record = create(&s, TODAY).await;

        let mut req = item_request(&record.id, "item-1", true);
        req.comment = Some("Carcasa con fisura menor".to_string());
        let first = s.checklist.save_item(req).await.unwrap();
        let second = s
            .checklist
            .save_item(item_request(&record.id, "item-1", false))
            .await
            .unwrap();

        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);
        let detail = s.completion.get_detail(&record.id).await.unwrap();
        let response = detail.checklist[0].response.clone().unwrap();
        assert!(!response.is_completed);
        assert_eq!(response.comment.as_deref(), Some("Carcasa con fisura menor"));

        let err = s
            .checklist
            .save_item(item_request(&record.id, "item-99", true))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    async fn test_signatures_drive_status() {
        let s = services().await;
        let record = create(&s, TODAY).await;

        let tecnico = s
            .signatures
            .create(sign_request(&record.id, SignatureRole::Tecnico))
            .await
            .unwrap();
        assert_eq!(tecnico.record.status, MaintenanceStatus::EnProceso);

        let duplicate = s
            .signatures
            .create(sign_request(&record.id, SignatureRole::Tecnico))
            .await
            .unwrap_err();
        assert!(matches!(duplicate, ServiceError::Conflict(_)));

        let responsable = s
            .signatures
            .create(sign_request(&record.id, SignatureRole::Responsable))
            .await
            .unwrap();

        let after_one = s.signatures.delete(&responsable.signature.id).await.unwrap();
        assert_eq!(after_one.status, MaintenanceStatus::EnProceso);

        let after_all = s.signatures.delete(&tecnico.signature.id).await.unwrap();
        assert_eq!(after_all.status, MaintenanceStatus::Pendiente);

        assert!(matches!(
            s.signatures.delete(&tecnico.signature.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    async fn test_duplicate_role_insert_maps_to_conflict() {
        let pool = memory_pool().await;
        let equipment = EquipmentService::new(pool.clone(), 30);
        let maintenance = MaintenanceService::new(pool.clone(), equipment);
        let signatures = SignatureService::new(pool.clone());
        let record = maintenance
            .create_record(
                CreateMaintenanceRequest {
                    equipment_id: "eq-1".to_string(),
                    template_id: "tpl-1".to_string(),
                    scheduled_date: date(TODAY),
                    kind: MaintenanceKind::Preventivo,
                    notes: None,
                },
                date(TODAY),
            )
            .await
            .unwrap()
            .record;
        signatures
            .create(sign_request(&record.id, SignatureRole::Tecnico))
            .await
            .unwrap();

        // mismo insert que haría una segunda petición concurrente
        let err = sqlx::query(
            r#"
            INSERT INTO signatures (id, record_id, role, signer_name, image, signed_at)
            VALUES ('sig-race', ?1, 'TECNICO', 'Otro técnico', ?2, '2025-03-10T10:00:00+00:00')
            "#,
        )
        .bind(&record.id)
        .bind(SIGNATURE_IMAGE)
        .execute(&pool)
        .await
        .unwrap_err();

        let mapped = ServiceError::on_unique_violation(err, || "rol ya firmado".to_string());
        assert!(matches!(mapped, ServiceError::Conflict(ref m) if m == "rol ya firmado"));

        let other = ServiceError::on_unique_violation(sqlx::Error::RowNotFound, String::new);
        assert!(matches!(other, ServiceError::Database(_)));
    }

    #[test]
    async fn test_signature_validation() {
        let s = services().await;
        let record = create(&s, TODAY).await;

        let mut empty_image = sign_request(&record.id, SignatureRole::Tecnico);
        empty_image.image = "data:image/png;base64,".to_string();
        assert!(matches!(
            s.signatures.create(empty_image).await,
            Err(ServiceError::Validation(_))
        ));

        let created = s
            .signatures
            .create(sign_request(&record.id, SignatureRole::Tecnico))
            .await
            .unwrap();

        let mut change_role = sign_request(&record.id, SignatureRole::Responsable);
        change_role.signature_id = Some(created.signature.id.clone());
        assert!(matches!(
            s.signatures.update(change_role).await,
            Err(ServiceError::Validation(_))
        ));

        let mut edit = sign_request(&record.id, SignatureRole::Tecnico);
        edit.signature_id = Some(created.signature.id.clone());
        edit.signer_name = "Técnico Reemplazo".to_string();
        let updated = s.signatures.update(edit).await.unwrap();
        assert_eq!(updated.signature.id, created.signature.id);
        assert_eq!(updated.signature.signer_name, "Técnico Reemplazo");
        assert_eq!(updated.record.status, MaintenanceStatus::EnProceso);
    }

    #[test]
    async fn test_completion_gate_is_enforced() {
        let s = services().await;
        let record = create(&s, TODAY).await;
        s.signatures
            .create(sign_request(&record.id, SignatureRole::Tecnico))
            .await
            .unwrap();
        s.signatures
            .create(sign_request(&record.id, SignatureRole::Responsable))
            .await
            .unwrap();

        let err = s
            .completion
            .complete(CompleteRequest {
                record_id: record.id.clone(),
                notes: None,
                checklist_responses: vec![],
                expected_version: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Rule(_)));

        let detail = s.completion.get_detail(&record.id).await.unwrap();
        assert_eq!(detail.record.status, MaintenanceStatus::EnProceso);
    }

    #[test]
    async fn test_complete_merges_submitted_responses() {
        let s = services().await;
        let record = create(&s, TODAY).await;
        s.signatures
            .create(sign_request(&record.id, SignatureRole::Tecnico))
            .await
            .unwrap();
        let signed = s
            .signatures
            .create(sign_request(&record.id, SignatureRole::Responsable))
            .await
            .unwrap();

        let completed = s
            .completion
            .complete(CompleteRequest {
                record_id: record.id.clone(),
                notes: Some("Sin observaciones".to_string()),
                checklist_responses: vec![ChecklistResponseInput {
                    item_id: "item-3".to_string(),
                    is_completed: true,
                    comment: None,
                }],
                expected_version: Some(signed.record.version),
            })
            .await
            .unwrap();

        assert_eq!(completed.status, MaintenanceStatus::Completada);
        assert_eq!(completed.version, signed.record.version + 1);
        assert!(completed.completed_at.is_some());
        assert_eq!(completed.notes.as_deref(), Some("Sin observaciones"));

        let detail = s.completion.get_detail(&record.id).await.unwrap();
        assert_eq!(
            detail.checklist[2].response.as_ref().map(|r| r.is_completed),
            Some(true)
        );
    }

    #[test]
    async fn test_stale_version_conflicts() {
        let s = services().await;
        let record = ready_to_complete(&s).await;

        let err = s
            .completion
            .complete(CompleteRequest {
                record_id: record.id.clone(),
                notes: None,
                checklist_responses: vec![],
                expected_version: Some(record.version - 1),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    async fn test_completed_record_only_accepts_admin_edits() {
        let s = services().await;
        let record = ready_to_complete(&s).await;
        s.completion
            .complete(CompleteRequest {
                record_id: record.id.clone(),
                notes: None,
                checklist_responses: vec![],
                expected_version: Some(record.version),
            })
            .await
            .unwrap();

        // firma y checklist cerrados para usuarios normales
        assert!(matches!(
            s.signatures
                .create(sign_request(&record.id, SignatureRole::Tecnico))
                .await,
            Err(ServiceError::Rule(_))
        ));
        assert!(matches!(
            s.checklist
                .save_item(item_request(&record.id, "item-2", true))
                .await,
            Err(ServiceError::Rule(_))
        ));

        let mut admin = item_request(&record.id, "item-2", true);
        admin.is_admin_edit = Some(true);
        assert!(matches!(
            s.checklist.save_item(admin.clone()).await,
            Err(ServiceError::Validation(_))
        ));

        admin.admin_name = Some("Jefa de Ingeniería".to_string());
        let edited = s.checklist.save_item(admin).await.unwrap();
        assert_eq!(edited.status, MaintenanceStatus::Completada);
        assert_eq!(
            edited.edited_after_completion_by.as_deref(),
            Some("Jefa de Ingeniería")
        );
        assert!(edited.edited_after_completion_at.is_some());

        let notes = s
            .maintenance
            .update_admin_notes(AdminNotesRequest {
                record_id: record.id.clone(),
                notes: Some("Se corrigió el ítem 2".to_string()),
                admin_name: "Jefa de Ingeniería".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(notes.notes.as_deref(), Some("Se corrigió el ítem 2"));
        assert_eq!(notes.version, edited.version + 1);
    }

    #[test]
    async fn test_admin_notes_require_completed_record() {
        let s = services().await;
        let record = create(&s, TODAY).await;

        let err = s
            .maintenance
            .update_admin_notes(AdminNotesRequest {
                record_id: record.id,
                notes: Some("nota".to_string()),
                admin_name: "Admin".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Rule(_)));
    }

    #[test]
    async fn test_cancel_is_terminal() {
        let s = services().await;
        let record = create(&s, TODAY).await;

        let cancelled = s
            .maintenance
            .cancel(CancelRequest {
                record_id: record.id.clone(),
                expected_version: Some(0),
            })
            .await
            .unwrap();
        assert_eq!(cancelled.status, MaintenanceStatus::Cancelada);

        assert!(matches!(
            s.maintenance
                .cancel(CancelRequest {
                    record_id: record.id.clone(),
                    expected_version: None,
                })
                .await,
            Err(ServiceError::Rule(_))
        ));
        assert!(matches!(
            s.signatures
                .create(sign_request(&record.id, SignatureRole::Tecnico))
                .await,
            Err(ServiceError::Rule(_))
        ));

        // una orden cancelada no genera conflicto de proximidad
        let conflict = s
            .equipment
            .check_conflict("eq-1", date("2025-03-12"), date(TODAY))
            .await
            .unwrap();
        assert!(conflict.is_none());
    }
}
