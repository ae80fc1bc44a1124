use std::sync::Arc;

use crate::error::Result;
use crate::flow::{Flow, FlowBuilder, FlowManager, FlowNode, FunctionSpec, PostAction};
use crate::handlers::HandlerRegistry;
use crate::message::PromptMessage;
use crate::schema::Schema;

use super::calendar::DynCalendar;
use super::gate::DepartmentGate;
use super::handlers::{
    GetAvailableDates, GetDepartments, RecordFields, RecordVisitDate, RecordVisitReasons,
};

pub const INTAKE_FLOW: &str = "patient_intake";

const SYSTEM_ROLE: &str = "Vous êtes Jérome, réceptionniste du centre médical Léo Lagrange, chargé \
de prendre rendez-vous chez un médecin. Collectez les informations utiles et la date du rendez-vous. \
Vous n'êtes pas un professionnel de santé et ne donnez aucun conseil. Gardez vos réponses courtes, \
ne supposez jamais les valeurs à passer aux fonctions et demandez des précisions si une réponse est \
ambiguë. Faites toujours avancer la conversation en appelant la fonction prévue.";

/// handler de chaque function du parcours d'admission
pub fn intake_handlers(calendar: DynCalendar) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry
        .register(
            "record_personal_details",
            Arc::new(RecordFields::new(&["name", "date_of_birth"])),
        )
        .register("record_prescriptions", Arc::new(RecordFields::new(&["prescriptions"])))
        .register("record_allergies", Arc::new(RecordFields::new(&["allergies"])))
        .register("record_conditions", Arc::new(RecordFields::new(&["conditions"])))
        .register("record_visit_reasons", Arc::new(RecordVisitReasons))
        .register("get_departments", Arc::new(GetDepartments))
        .register(
            "get_available_dates",
            Arc::new(GetAvailableDates::new(Arc::clone(&calendar))),
        )
        .register("record_user_visit_date", Arc::new(RecordVisitDate::new(calendar)));
    registry
}

fn named_items(description: &str) -> Schema {
    Schema::array(
        Schema::object()
            .property("name", Schema::string().with_description(description))
            .required("name"),
    )
}

/// 构建完整的患者登记流程图
pub fn patient_intake_flow(handlers: &HandlerRegistry) -> Result<Flow> {
    let mut builder = FlowBuilder::new(INTAKE_FLOW);
    builder
        .initial_message(PromptMessage::system(SYSTEM_ROLE))
        .set_initial("start")
        .set_terminal("end");

    builder.add_node(
        FlowNode::new("start")
            .with_message(PromptMessage::system(
                "Présentez-vous (Jérome), puis demandez le prénom, le nom et la date de naissance \
                 avec l'année. Reformatez la date en AAAA-MM-JJ avant d'appeler \
                 record_personal_details.",
            ))
            .with_function(
                FunctionSpec::new("record_personal_details")
                    .with_description("Enregistre l'identité de l'utilisateur.")
                    .with_parameters(
                        Schema::object()
                            .property(
                                "name",
                                Schema::string().with_description("prénom et nom"),
                            )
                            .property(
                                "date_of_birth",
                                Schema::string().with_description("date de naissance, AAAA-MM-JJ"),
                            )
                            .required("name")
                            .required("date_of_birth"),
                    )
                    .with_handler(handlers.resolve("record_personal_details")?)
                    .transition_to("get_prescriptions"),
            ),
    );

    builder.add_node(
        FlowNode::new("get_prescriptions")
            .with_message(PromptMessage::system(
                "Demandez la liste des ordonnances en cours. Une fois la liste donnée, ou l'absence \
                 d'ordonnance confirmée, appelez record_prescriptions.",
            ))
            .with_function(
                FunctionSpec::new("record_prescriptions")
                    .with_description("Enregistre les prescriptions de l'utilisateur.")
                    .with_parameters(
                        Schema::object()
                            .property(
                                "prescriptions",
                                Schema::array(
                                    Schema::object()
                                        .property(
                                            "medication",
                                            Schema::string().with_description("nom du médicament"),
                                        )
                                        .property(
                                            "dosage",
                                            Schema::string().with_description("dosage"),
                                        )
                                        .required("medication")
                                        .required("dosage"),
                                ),
                            )
                            .required("prescriptions"),
                    )
                    .with_handler(handlers.resolve("record_prescriptions")?)
                    .transition_to("get_allergies"),
            ),
    );

    builder.add_node(
        FlowNode::new("get_allergies")
            .with_message(PromptMessage::system(
                "Demandez si l'utilisateur a des allergies, puis appelez record_allergies.",
            ))
            .with_function(
                FunctionSpec::new("record_allergies")
                    .with_description("Enregistre les allergies de l'utilisateur.")
                    .with_parameters(
                        Schema::object()
                            .property("allergies", named_items("nom de l'allergie"))
                            .required("allergies"),
                    )
                    .with_handler(handlers.resolve("record_allergies")?)
                    .transition_to("get_conditions"),
            ),
    );

    builder.add_node(
        FlowNode::new("get_conditions")
            .with_message(PromptMessage::system(
                "Renseignez-vous sur les problèmes de santé autres que le motif de visite, puis \
                 appelez record_conditions.",
            ))
            .with_function(
                FunctionSpec::new("record_conditions")
                    .with_description("Enregistre les conditions médicales de l'utilisateur.")
                    .with_parameters(
                        Schema::object()
                            .property("conditions", named_items("condition médicale"))
                            .required("conditions"),
                    )
                    .with_handler(handlers.resolve("record_conditions")?)
                    .transition_to("get_visit_reasons"),
            ),
    );

    builder.add_node(
        FlowNode::new("get_visit_reasons")
            .with_message(PromptMessage::system(
                "Demandez ce qui amène l'utilisateur. Vérifiez avec get_departments que le motif \
                 relève d'un département du centre ; sinon, invitez-le à consulter un autre centre. \
                 Enregistrez ensuite les motifs avec record_visit_reasons.",
            ))
            .with_function(
                FunctionSpec::new("get_departments")
                    .with_description("Liste les départements de santé disponibles au centre.")
                    .with_parameters(Schema::object().property(
                        "department",
                        Schema::string().with_description("département correspondant au motif"),
                    ))
                    .with_handler(handlers.resolve("get_departments")?),
            )
            .with_function(
                FunctionSpec::new("record_visit_reasons")
                    .with_description("Enregistre les motifs de la visite.")
                    .with_parameters(
                        Schema::object()
                            .property("visit_reasons", named_items("motif de la visite"))
                            .required("visit_reasons"),
                    )
                    .with_handler(handlers.resolve("record_visit_reasons")?)
                    .transition_to("get_available_dates"),
            ),
    );

    builder.add_node(
        FlowNode::new("get_available_dates")
            .with_message(PromptMessage::system(
                "Récupérez les dates disponibles et demandez au patient laquelle il préfère.",
            ))
            .with_function(
                FunctionSpec::new("get_available_dates")
                    .with_description("Dates libres sur les deux prochaines semaines.")
                    .with_handler(handlers.resolve("get_available_dates")?)
                    .transition_to("get_user_visit_date"),
            ),
    );

    builder.add_node(
        FlowNode::new("get_user_visit_date")
            .with_message(PromptMessage::system(
                "Recueillez la date de visite souhaitée, reformatez-la en AAAA-MM-JJ puis appelez \
                 record_user_visit_date.",
            ))
            .with_function(
                FunctionSpec::new("record_user_visit_date")
                    .with_description("Enregistre la date de visite au format AAAA-MM-JJ.")
                    .with_parameters(
                        Schema::object()
                            .property(
                                "visit_date",
                                Schema::string().with_description("date de visite, AAAA-MM-JJ"),
                            )
                            .required("visit_date"),
                    )
                    .with_handler(handlers.resolve("record_user_visit_date")?)
                    .transition_to("confirm"),
            ),
    );

    builder.add_node(
        FlowNode::new("confirm")
            .with_message(PromptMessage::system(
                "Confirmez que la date est prise en compte, remerciez l'utilisateur puis appelez \
                 complete_intake.",
            ))
            .with_function(
                FunctionSpec::new("complete_intake")
                    .with_description("Termine le processus d'admission.")
                    .transition_to("end"),
            ),
    );

    builder.add_node(
        FlowNode::new("end")
            .with_message(PromptMessage::system(
                "Remerciez l'utilisateur pour son temps et mettez fin à la conversation.",
            ))
            .with_post_action(PostAction::EndConversation),
    );

    builder.build()
}

/// 新会话：独立的 FlowManager，带科室检查
pub fn intake_session(flow: Arc<Flow>) -> Result<FlowManager> {
    FlowManager::new(flow)?.with_transition_controller(Arc::new(DepartmentGate::default()))
}
