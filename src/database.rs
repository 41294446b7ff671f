use crate::models::{
    audit::{AuditAction, AuditLogEntry, AuditResourceKind},
    checklist::{
        ChecklistCategory, ChecklistInfo, ChecklistInstance, ChecklistItem, ChecklistKind,
        ChecklistStatus,
    },
    job_position::{JobPosition, JobPositionHistory},
    notification::Notification,
    role::Role,
    session::Identity,
    system_config::SystemConfig,
    user::{User, UserStatus},
};
use chrono::{DateTime, TimeZone, Utc};
use pwhash::bcrypt;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    RwLock,
};

/// In-memory store standing where a database would. The checklist
/// catalog and demo credential table are read-only registries; every
/// other collection is mutated through the model methods.
pub struct Store {
    pub categories: Vec<ChecklistCategory>,
    pub users: RwLock<Vec<User>>,
    pub instances: RwLock<Vec<ChecklistInstance>>,
    pub job_positions: RwLock<Vec<JobPosition>>,
    pub position_history: RwLock<Vec<JobPositionHistory>>,
    pub audit_log: RwLock<Vec<AuditLogEntry>>,
    pub notifications: RwLock<Vec<Notification>>,
    pub system_config: RwLock<SystemConfig>,
    pub sessions: RwLock<HashMap<String, Identity>>,
    demo_credentials: Vec<(String, Role)>,
    session_secret: String,
    counter: AtomicU64,
}

impl Store {
    pub fn seed(session_secret: String) -> Store {
        let seed_hash = bcrypt::hash("cambiar123").expect("SEED_HASH_FAILED");

        Store {
            categories: seed_categories(),
            users: RwLock::new(seed_users(&seed_hash)),
            instances: RwLock::new(seed_instances()),
            job_positions: RwLock::new(seed_job_positions()),
            position_history: RwLock::new(Vec::new()),
            audit_log: RwLock::new(seed_audit_log()),
            notifications: RwLock::new(Vec::new()),
            system_config: RwLock::new(SystemConfig::default()),
            sessions: RwLock::new(HashMap::new()),
            demo_credentials: vec![
                ("admin@minera.com".to_string(), Role::Admin),
                ("subadmin@minera.com".to_string(), Role::ContractAdmin),
                ("usuario@minera.com".to_string(), Role::Operational),
            ],
            session_secret,
            counter: AtomicU64::new(1000),
        }
    }

    pub fn mint_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.counter.fetch_add(1, Ordering::Relaxed))
    }

    pub fn secret(&self) -> &[u8] {
        self.session_secret.as_bytes()
    }

    pub fn demo_role(&self, email: &str) -> Option<Role> {
        self.demo_credentials
            .iter()
            .find(|(candidate, _)| candidate == email)
            .map(|(_, role)| *role)
    }
}

fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("SEED_TIMESTAMP_INVALID")
}

fn info(id: &str, title: &str, kind: ChecklistKind) -> ChecklistInfo {
    ChecklistInfo {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        kind,
    }
}

fn category(
    id: &str,
    name: &str,
    description: &str,
    checklists: Vec<ChecklistInfo>,
) -> ChecklistCategory {
    ChecklistCategory {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        checklists,
    }
}

fn seed_categories() -> Vec<ChecklistCategory> {
    use ChecklistKind::*;

    vec![
        category(
            "general",
            "Checklists Generales",
            "Checklists para seguridad general y orden en faenas",
            vec![
                info("gen-1", "Checklist diario de seguridad general", Equipment),
                info("gen-2", "Checklist semanal de seguridad general", Equipment),
                info("gen-3", "Checklist mensual de seguridad general", Equipment),
                info("gen-4", "Checklist de orden y aseo de faenas", Maintenance),
            ],
        ),
        category(
            "mining",
            "Faenas Mineras Específicas",
            "Checklists para operaciones en minas subterráneas y a cielo abierto",
            vec![
                info("min-1", "Checklist de ventilación y calidad del aire", Mining),
                info(
                    "min-2",
                    "Checklist de sostenimiento y estabilidad de galerías",
                    Mining,
                ),
                info(
                    "min-3",
                    "Checklist de sistemas de iluminación y señalización",
                    Mining,
                ),
                info(
                    "min-4",
                    "Checklist de vías de evacuación y refugios subterráneos",
                    Mining,
                ),
                info("min-5", "Checklist diario para maquinaria subterránea", Equipment),
                info(
                    "min-6",
                    "Checklist de estabilidad y seguridad de taludes",
                    Mining,
                ),
                info("min-7", "Checklist para caminos internos y accesos", Mining),
                info("min-8", "Checklist de control de polvo en suspensión", Mining),
                info("min-9", "Checklist diario de equipos pesados", Equipment),
                info("min-10", "Checklist de inspección de frentes de trabajo", Mining),
                info("min-11", "Checklist de operación de palas y cargadores", Equipment),
                info("min-12", "Checklist de operación de camiones mineros", Equipment),
                info("min-13", "Checklist de inspección de fortificación", Mining),
                info("min-14", "Checklist de operación de jumbos", Equipment),
                info("min-15", "Checklist de inspección de piques mineros", Mining),
                info("min-16", "Checklist de operación de scoops", Equipment),
                info(
                    "min-17",
                    "Checklist de inspección de chimeneas de ventilación",
                    Mining,
                ),
                info("min-18", "Checklist de operación de equipos de levante", Equipment),
                info(
                    "min-19",
                    "Checklist de inspección de sistemas de drenaje",
                    Mining,
                ),
                info(
                    "min-20",
                    "Checklist de operación de chancadores primarios",
                    Equipment,
                ),
            ],
        ),
        category(
            "drilling",
            "Perforación y Tronadura",
            "Checklists para operaciones de perforación y tronadura",
            vec![
                info("dri-1", "Checklist previo a la perforación", Mining),
                info("dri-2", "Checklist de carguío de explosivos", Explosives),
                info("dri-3", "Checklist previo a tronadura", Explosives),
                info("dri-4", "Checklist posterior a tronadura", Explosives),
                info("dri-5", "Checklist de control de tiros fallidos", Explosives),
                info(
                    "dri-6",
                    "Checklist de inspección de equipos de perforación",
                    Equipment,
                ),
                info(
                    "dri-7",
                    "Checklist de seguridad para perforación en bancos",
                    Mining,
                ),
                info("dri-8", "Checklist de perforación en frentes de desarrollo", Mining),
                info("dri-9", "Checklist de perforación en chimeneas", Mining),
                info("dri-10", "Checklist de perforación en piques", Mining),
                info(
                    "dri-11",
                    "Checklist de mantenimiento de equipos de perforación",
                    Maintenance,
                ),
                info("dri-12", "Checklist de diseño de malla de perforación", Mining),
                info(
                    "dri-13",
                    "Checklist de control de calidad de perforación",
                    Mining,
                ),
                info(
                    "dri-14",
                    "Checklist de seguridad para carguío de explosivos",
                    Explosives,
                ),
                info(
                    "dri-15",
                    "Checklist de transporte interno de explosivos",
                    Explosives,
                ),
                info("dri-16", "Checklist de evacuación para tronadura", Explosives),
                info(
                    "dri-17",
                    "Checklist de monitoreo de vibraciones por tronadura",
                    Mining,
                ),
                info(
                    "dri-18",
                    "Checklist de control de fragmentación post-tronadura",
                    Mining,
                ),
                info(
                    "dri-19",
                    "Checklist de inspección de áreas post-tronadura",
                    Explosives,
                ),
                info(
                    "dri-20",
                    "Checklist de gestión de residuos de explosivos",
                    Explosives,
                ),
            ],
        ),
        category(
            "explosives",
            "Manipulación de Explosivos",
            "Checklists para manejo seguro de explosivos",
            vec![
                info("exp-1", "Checklist diario de polvorines", Explosives),
                info(
                    "exp-2",
                    "Checklist de transporte seguro de explosivos",
                    Explosives,
                ),
            ],
        ),
        category(
            "transport",
            "Transporte",
            "Checklists para transporte de personal y materiales",
            vec![
                info("tra-1", "Checklist de vehículos livianos y camionetas", Transport),
                info("tra-2", "Checklist de transporte de personal", Transport),
                info(
                    "tra-3",
                    "Checklist de transporte de sustancias peligrosas",
                    Transport,
                ),
                info(
                    "tra-4",
                    "Checklist para transporte interno de cargas especiales",
                    Transport,
                ),
            ],
        ),
        category(
            "maintenance",
            "Mantenimiento",
            "Checklists para mantenimiento de equipos e instalaciones",
            vec![
                info("mai-1", "Checklist de mantenimiento eléctrico", Maintenance),
                info("mai-2", "Checklist de mantenimiento mecánico general", Maintenance),
                info(
                    "mai-3",
                    "Checklist específico para mantenimiento de equipos críticos",
                    Maintenance,
                ),
            ],
        ),
        category(
            "critical",
            "Operación de Equipos Críticos",
            "Checklists para operación segura de equipos críticos",
            vec![
                info("cri-1", "Checklist para operación de grúas e izaje", Equipment),
                info(
                    "cri-2",
                    "Checklist para calderas y recipientes a presión",
                    Equipment,
                ),
                info(
                    "cri-3",
                    "Checklist para sistemas de transporte vertical",
                    Transport,
                ),
                info("cri-4", "Checklist para sistemas de bombeo y drenaje", Equipment),
            ],
        ),
        category(
            "hazardous",
            "Manejo de Sustancias Peligrosas y Residuos Mineros",
            "Checklists para manejo seguro de sustancias peligrosas y residuos",
            vec![
                info(
                    "haz-1",
                    "Checklist de almacenamiento y manejo seguro de combustibles",
                    Maintenance,
                ),
                info(
                    "haz-2",
                    "Checklist de almacenamiento y manejo de reactivos químicos",
                    Maintenance,
                ),
                info(
                    "haz-3",
                    "Checklist de inspección de tranques de relaves y botaderos",
                    Mining,
                ),
                info(
                    "haz-4",
                    "Checklist de gestión de residuos industriales y peligrosos",
                    Maintenance,
                ),
            ],
        ),
        category(
            "emergency",
            "Emergencias y Evacuación",
            "Checklists para preparación y respuesta ante emergencias",
            vec![
                info("eme-1", "Checklist diario de equipos de emergencia", Emergency),
                info("eme-2", "Checklist para simulacros de evacuación", Emergency),
                info(
                    "eme-3",
                    "Checklist de sistemas de comunicación de emergencia",
                    Emergency,
                ),
                info(
                    "eme-4",
                    "Checklist posterior a incidentes y emergencias",
                    Emergency,
                ),
            ],
        ),
        category(
            "health",
            "Salud Ocupacional",
            "Checklists para monitoreo y control de riesgos para la salud",
            vec![
                info("hea-1", "Checklist de monitoreo de ruido ocupacional", Maintenance),
                info("hea-2", "Checklist de exposición a polvo y sílice", Mining),
                info(
                    "hea-3",
                    "Checklist de condiciones ergonómicas en puestos de trabajo",
                    Maintenance,
                ),
                info("hea-4", "Checklist de control de temperaturas extremas", Mining),
            ],
        ),
        category(
            "environment",
            "Medio Ambiente",
            "Checklists para control y monitoreo ambiental",
            vec![
                info("env-1", "Checklist de cumplimiento ambiental general", Maintenance),
                info("env-2", "Checklist de monitoreo de emisiones", Mining),
                info(
                    "env-3",
                    "Checklist de prevención y respuesta ante derrames",
                    Emergency,
                ),
            ],
        ),
        category(
            "audit",
            "Auditorías y Gestión",
            "Checklists para auditorías y control documental",
            vec![
                info(
                    "aud-1",
                    "Checklist de auditorías internas de seguridad",
                    Maintenance,
                ),
                info("aud-2", "Checklist de auditorías ambientales", Maintenance),
                info("aud-3", "Checklist de control documental normativo", Maintenance),
            ],
        ),
    ]
}

fn seed_users(password_hash: &str) -> Vec<User> {
    let user = |id: &str,
                full_name: &str,
                email: &str,
                role: Role,
                status: UserStatus,
                job_position_id: Option<&str>,
                assigned: &[&str]| User {
        id: id.to_string(),
        full_name: full_name.to_string(),
        email: email.to_string(),
        password: password_hash.to_string(),
        role,
        status,
        last_login: Some(ts(2024, 1, 19, 8, 15)),
        created_at: ts(2024, 1, 1, 0, 0),
        job_position_id: job_position_id.map(str::to_string),
        assigned_checklists: assigned.iter().map(|id| id.to_string()).collect(),
    };

    vec![
        user(
            "usr-1",
            "Ana Riquelme",
            "admin@minera.com",
            Role::Admin,
            UserStatus::Active,
            None,
            &[],
        ),
        user(
            "usr-2",
            "Jorge Salas",
            "subadmin@minera.com",
            Role::ContractAdmin,
            UserStatus::Active,
            None,
            &[],
        ),
        user(
            "usr-3",
            "Juan Pérez",
            "usuario@minera.com",
            Role::Operational,
            UserStatus::Active,
            Some("mining-assistant"),
            &["gen-1", "gen-4"],
        ),
        user(
            "usr-4",
            "María González",
            "maria.gonzalez@minera.com",
            Role::Operational,
            UserStatus::Active,
            Some("underground-operator"),
            &["min-5", "gen-1"],
        ),
        user(
            "usr-5",
            "Carlos Muñoz",
            "carlos.munoz@minera.com",
            Role::Supervisor,
            UserStatus::Active,
            Some("safety-supervisor"),
            &["aud-1"],
        ),
        user(
            "usr-6",
            "Pedro Soto",
            "pedro.soto@minera.com",
            Role::Preventionist,
            UserStatus::Inactive,
            None,
            &[],
        ),
    ]
}

fn seed_job_positions() -> Vec<JobPosition> {
    let position = |id: &str,
                    name: &str,
                    description: &str,
                    operational_role: &str,
                    job_title: &str,
                    defaults: &[&str],
                    required_supervisor: bool,
                    required_preventionist: bool| JobPosition {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        operational_role: operational_role.to_string(),
        job_title: job_title.to_string(),
        default_checklists: defaults.iter().map(|id| id.to_string()).collect(),
        required_supervisor,
        required_preventionist,
        created_at: ts(2024, 1, 1, 0, 0),
        updated_at: ts(2024, 1, 1, 0, 0),
    };

    vec![
        position(
            "underground-operator",
            "Operador de Maquinaria Subterránea",
            "Responsable de operar y mantener maquinaria pesada en entornos subterráneos",
            "Usuario Operacional",
            "Operador de Maquinaria",
            &["min-5", "min-14", "min-16", "gen-1", "min-1", "min-3", "min-4"],
            true,
            true,
        ),
        position(
            "master-builder",
            "Maestro de Obras",
            "Supervisa y coordina las actividades de construcción y personal a cargo",
            "Usuario Operacional",
            "Maestro de Obras",
            &["gen-4", "min-6", "min-7", "min-10", "min-13", "gen-1", "haz-4"],
            true,
            true,
        ),
        position(
            "rigger",
            "Rigger",
            "Especialista en montaje y manipulación de equipos de izaje",
            "Usuario Operacional",
            "Rigger",
            &["cri-1", "min-18", "gen-1", "gen-4", "tra-4", "mai-2"],
            true,
            true,
        ),
        position(
            "safety-supervisor",
            "Supervisor de Seguridad",
            "Supervisa y garantiza el cumplimiento de normas de seguridad en el área",
            "Supervisor",
            "Supervisor de Seguridad",
            &["aud-1", "aud-2", "aud-3", "gen-2", "gen-3", "eme-2", "eme-3"],
            false,
            true,
        ),
        position(
            "preventionist",
            "Prevencionista de Riesgos",
            "Responsable de la seguridad y prevención de riesgos en toda la operación",
            "Prevencionista",
            "Prevencionista de Riesgos",
            &[
                "aud-1", "aud-2", "aud-3", "gen-3", "eme-1", "eme-2", "eme-3", "eme-4", "env-1",
                "env-3",
            ],
            false,
            false,
        ),
        position(
            "heavy-equipment-operator",
            "Operador de Equipos Pesados",
            "Opera maquinaria pesada como excavadoras, cargadores y camiones mineros",
            "Usuario Operacional",
            "Operador de Maquinaria",
            &["min-9", "min-11", "min-12", "gen-1", "gen-4", "mai-2", "mai-3"],
            true,
            true,
        ),
        position(
            "mining-assistant",
            "Ayudante Minero",
            "Asiste en las operaciones mineras y apoya en tareas generales de la mina",
            "Usuario Operacional",
            "Ayudante Minero",
            &["gen-1", "gen-4", "min-1", "min-3", "min-4", "min-8"],
            true,
            true,
        ),
    ]
}

fn seed_instances() -> Vec<ChecklistInstance> {
    let item = |id: &str,
                description: &str,
                required: bool,
                has_evidence: bool,
                completed: bool,
                evidence: Option<&str>,
                notes: Option<&str>| ChecklistItem {
        id: id.to_string(),
        description: description.to_string(),
        required,
        has_evidence,
        completed,
        evidence: evidence.map(str::to_string),
        notes: notes.map(str::to_string),
    };

    vec![
        ChecklistInstance {
            id: "chk-1".to_string(),
            title: "Inspección Camión Minero #456".to_string(),
            kind: ChecklistKind::Equipment,
            status: ChecklistStatus::InProgress,
            assigned_to: "Juan Pérez".to_string(),
            due_date: ts(2024, 1, 21, 0, 0),
            created_at: ts(2024, 1, 20, 0, 0),
            description: Some(
                "Inspección de seguridad del camión minero antes de iniciar operaciones en la zona norte."
                    .to_string(),
            ),
            items: vec![
                item("101", "Verificar nivel de aceite", true, false, false, None, None),
                item(
                    "102",
                    "Comprobar presión de neumáticos",
                    true,
                    true,
                    false,
                    None,
                    None,
                ),
                item("103", "Revisar sistema de frenos", true, true, false, None, None),
                item(
                    "104",
                    "Verificar luces y señalización",
                    false,
                    true,
                    false,
                    None,
                    None,
                ),
            ],
        },
        ChecklistInstance {
            id: "chk-2".to_string(),
            title: "Checklist Perforación Zona Sur".to_string(),
            kind: ChecklistKind::Mining,
            status: ChecklistStatus::InProgress,
            assigned_to: "María González".to_string(),
            due_date: ts(2024, 1, 21, 0, 0),
            created_at: ts(2024, 1, 20, 0, 0),
            description: Some(
                "Verificación de seguridad para operaciones de perforación en la zona sur del yacimiento."
                    .to_string(),
            ),
            items: vec![
                item(
                    "201",
                    "Verificar equipo de protección personal",
                    true,
                    true,
                    true,
                    Some("epp-zona-sur.jpg"),
                    None,
                ),
                item(
                    "202",
                    "Comprobar estabilidad del terreno",
                    true,
                    true,
                    false,
                    None,
                    None,
                ),
                item(
                    "203",
                    "Revisar equipo de perforación",
                    true,
                    false,
                    true,
                    None,
                    Some(
                        "Equipo en buen estado, se realizó mantenimiento preventivo la semana pasada.",
                    ),
                ),
                item(
                    "204",
                    "Verificar sistema de ventilación",
                    false,
                    true,
                    false,
                    None,
                    None,
                ),
            ],
        },
        ChecklistInstance {
            id: "chk-3".to_string(),
            title: "Checklist de vehículos livianos - Camioneta 12".to_string(),
            kind: ChecklistKind::Transport,
            status: ChecklistStatus::Pending,
            assigned_to: "Carlos Muñoz".to_string(),
            due_date: ts(2024, 1, 25, 0, 0),
            created_at: ts(2024, 1, 20, 0, 0),
            description: None,
            items: vec![
                item("301", "Revisar cinturones de seguridad", true, false, false, None, None),
                item("302", "Verificar estado de neumáticos", true, true, false, None, None),
            ],
        },
    ]
}

fn seed_audit_log() -> Vec<AuditLogEntry> {
    let entry = |n: u32,
                 timestamp: DateTime<Utc>,
                 user_id: &str,
                 user_name: &str,
                 action: AuditAction,
                 resource_type: AuditResourceKind,
                 resource_id: &str,
                 resource_name: &str,
                 details: &str| AuditLogEntry {
        id: format!("log-{n}"),
        timestamp,
        user_id: user_id.to_string(),
        user_name: user_name.to_string(),
        action,
        resource_type,
        resource_id: resource_id.to_string(),
        resource_name: resource_name.to_string(),
        details: details.to_string(),
        ip_address: format!("192.168.10.{}", 10 + n),
    };

    vec![
        entry(
            1,
            ts(2024, 1, 15, 8, 2),
            "usr-1",
            "Ana Riquelme",
            AuditAction::Login,
            AuditResourceKind::User,
            "usr-1",
            "Ana Riquelme",
            "Inicio de sesión",
        ),
        entry(
            2,
            ts(2024, 1, 15, 8, 30),
            "usr-1",
            "Ana Riquelme",
            AuditAction::Create,
            AuditResourceKind::User,
            "usr-4",
            "María González",
            "Creación de usuario operacional",
        ),
        entry(
            3,
            ts(2024, 1, 15, 9, 5),
            "usr-1",
            "Ana Riquelme",
            AuditAction::Assign,
            AuditResourceKind::Checklist,
            "underground-operator",
            "Operador de Maquinaria Subterránea",
            "Asignación de checklists por defecto",
        ),
        entry(
            4,
            ts(2024, 1, 16, 7, 45),
            "usr-4",
            "María González",
            AuditAction::Login,
            AuditResourceKind::User,
            "usr-4",
            "María González",
            "Inicio de sesión",
        ),
        entry(
            5,
            ts(2024, 1, 16, 8, 10),
            "usr-4",
            "María González",
            AuditAction::Update,
            AuditResourceKind::Checklist,
            "chk-2",
            "Checklist Perforación Zona Sur",
            "Actualización de ítems del checklist",
        ),
        entry(
            6,
            ts(2024, 1, 16, 12, 0),
            "usr-4",
            "María González",
            AuditAction::Logout,
            AuditResourceKind::User,
            "usr-4",
            "María González",
            "Cierre de sesión",
        ),
        entry(
            7,
            ts(2024, 1, 17, 9, 20),
            "usr-5",
            "Carlos Muñoz",
            AuditAction::View,
            AuditResourceKind::Report,
            "rep-semanal",
            "Reporte semanal de cumplimiento",
            "Visualización de reporte",
        ),
        entry(
            8,
            ts(2024, 1, 17, 10, 5),
            "usr-1",
            "Ana Riquelme",
            AuditAction::Update,
            AuditResourceKind::SystemConfig,
            "system-config",
            "Configuración del sistema",
            "Cambio de frecuencia de recordatorios",
        ),
        entry(
            9,
            ts(2024, 1, 18, 8, 0),
            "usr-3",
            "Juan Pérez",
            AuditAction::Login,
            AuditResourceKind::User,
            "usr-3",
            "Juan Pérez",
            "Inicio de sesión",
        ),
        entry(
            10,
            ts(2024, 1, 18, 8, 40),
            "usr-3",
            "Juan Pérez",
            AuditAction::Update,
            AuditResourceKind::Checklist,
            "chk-1",
            "Inspección Camión Minero #456",
            "Actualización de ítems del checklist",
        ),
        entry(
            11,
            ts(2024, 1, 18, 14, 30),
            "usr-1",
            "Ana Riquelme",
            AuditAction::Export,
            AuditResourceKind::Report,
            "audit-log",
            "Registro de auditoría",
            "Exportación en formato csv",
        ),
        entry(
            12,
            ts(2024, 1, 19, 8, 15),
            "usr-2",
            "Jorge Salas",
            AuditAction::Delete,
            AuditResourceKind::User,
            "usr-9",
            "Usuario de prueba",
            "Eliminación de cuenta de prueba",
        ),
    ]
}
